use anyhow::Result;
use clap::Parser;
use internmatch_core::{MatchOptions, Weights};
use server::{build_app, load_catalog, AppState, DatasetSource, DEFAULT_MAX_UPLOAD_BYTES};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Dataset file or directory (.json / .jsonl)
    #[arg(long, env = "INTERNMATCH_DATASET", conflicts_with = "dataset_url")]
    dataset: Option<String>,
    /// Fetch the dataset from this URL instead
    #[arg(long, env = "INTERNMATCH_DATASET_URL")]
    dataset_url: Option<String>,
    /// Score weights, e.g. skills=0.52,location=0.2,education=0.16,sector=0.12
    #[arg(long, env = "INTERNMATCH_WEIGHTS", default_value_t = Weights::DEFAULT)]
    weights: Weights,
    /// Ranked results returned per query
    #[arg(long, env = "INTERNMATCH_RESULT_LIMIT", default_value_t = 50)]
    limit: usize,
    /// Score at most this many records per query
    #[arg(long, env = "INTERNMATCH_MAX_RECORDS")]
    max_records: Option<usize>,
    /// Largest accepted dataset upload, in bytes
    #[arg(long, env = "INTERNMATCH_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    if (args.weights.sum() - 1.0).abs() > 1e-6 {
        tracing::warn!(weights = %args.weights, "weights do not sum to 1; scores are no longer bounded by ~1.0");
    }

    let options = MatchOptions { weights: args.weights, limit: args.limit, max_records: args.max_records };
    let state = AppState::new(options).with_upload_limit(args.max_upload_bytes);

    let source = match (args.dataset, args.dataset_url) {
        (Some(path), _) => Some(DatasetSource::Path(path)),
        (None, Some(url)) => Some(DatasetSource::Url(url)),
        (None, None) => None,
    };
    match source {
        Some(source) => match load_catalog(&source).await {
            Ok(catalog) => state.replace(catalog),
            // Serve anyway: queries answer "not ready" until a dataset is uploaded.
            Err(err) => tracing::error!(?source, "Dataset load error: {err:#}"),
        },
        None => tracing::warn!("no dataset configured; waiting for POST /dataset"),
    }

    let app = build_app(state);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
