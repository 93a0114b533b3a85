use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use internmatch_core::dataset::parse_dataset_json;
use internmatch_core::persist::load_dataset_path;
use internmatch_core::{find_matches, Catalog, MatchOptions, Profile, RecordId, ScoredResult, VocabField, Vocabulary};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;

use errors::ApiError;

/// Where the startup dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Path(String),
    Url(String),
}

/// Largest accepted `POST /dataset` body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// Current snapshot. Replaced wholesale on every load; `None` until the first one succeeds.
    pub catalog: Arc<RwLock<Option<Arc<Catalog>>>>,
    pub options: MatchOptions,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(options: MatchOptions) -> Self {
        Self { catalog: Arc::new(RwLock::new(None)), options, max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn with_catalog(options: MatchOptions, catalog: Catalog) -> Self {
        let state = Self::new(options);
        state.replace(catalog);
        state
    }

    pub fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().clone()
    }

    pub fn replace(&self, catalog: Catalog) {
        *self.catalog.write() = Some(Arc::new(catalog));
    }

    fn require_snapshot(&self) -> Result<Arc<Catalog>, ApiError> {
        self.snapshot().ok_or(ApiError::Match(internmatch_core::MatchError::NotReady))
    }
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub records: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub took_s: f64,
    pub total_scored: usize,
    pub results: Vec<ScoredResult>,
}

#[derive(Serialize)]
pub struct LoadResponse {
    pub records: usize,
    pub skipped: usize,
    pub tokens: usize,
}

#[derive(Deserialize)]
pub struct SuggestParams {
    pub field: String,
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct IndexParams {
    #[serde(default)]
    pub contains: bool,
}

#[derive(Serialize)]
pub struct IndexLookup {
    pub token: String,
    pub ids: Vec<RecordId>,
}

/// Load the startup dataset. Fetch and parse failures are returned to the caller,
/// which decides whether to serve in the not-ready state.
pub async fn load_catalog(source: &DatasetSource) -> Result<Catalog> {
    let loaded = match source {
        DatasetSource::Path(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || load_dataset_path(&path)).await??
        }
        DatasetSource::Url(url) => {
            let body = reqwest::get(url)
                .await
                .with_context(|| format!("fetching dataset from {url}"))?
                .error_for_status()
                .context("Failed to fetch dataset")?
                .text()
                .await?;
            parse_dataset_json(&body).context("parsing fetched dataset")?
        }
    };
    Ok(Catalog::from_loaded(loaded))
}

pub fn build_app(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status_handler))
        .route("/vocab", get(vocab_handler))
        .route("/suggest", get(suggest_handler))
        .route("/match", post(match_handler))
        .route("/dataset", post(dataset_handler).layer(upload_limit))
        .route("/index/:token", get(index_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.snapshot();
    Json(StatusResponse {
        ready: snapshot.is_some(),
        records: snapshot.as_ref().map_or(0, |c| c.len()),
        skipped: snapshot.as_ref().map_or(0, |c| c.skipped),
    })
}

pub async fn vocab_handler(State(state): State<AppState>) -> Result<Json<Vocabulary>, ApiError> {
    Ok(Json(state.require_snapshot()?.vocabulary.clone()))
}

pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let field: VocabField = params.field.parse().map_err(ApiError::BadRequest)?;
    let catalog = state.require_snapshot()?;
    Ok(Json(catalog.vocabulary.suggest(field, &params.q)))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<MatchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let snapshot = state.snapshot();
    let opts = state.options;
    let total_scored = snapshot
        .as_ref()
        .map_or(0, |c| opts.max_records.map_or(c.len(), |cap| cap.min(c.len())));
    // Scoring is CPU-bound; keep it off the async workers.
    let results = tokio::task::spawn_blocking(move || find_matches(snapshot.as_deref(), &profile, &opts))
        .await
        .context("scoring task failed")??;
    let elapsed = start.elapsed();
    Ok(Json(MatchResponse { took_s: elapsed.as_secs_f64(), total_scored, results }))
}

/// Replace the catalog with an uploaded JSON array. A body that fails to parse
/// leaves the current catalog in place.
pub async fn dataset_handler(State(state): State<AppState>, body: String) -> Result<Json<LoadResponse>, ApiError> {
    let catalog = tokio::task::spawn_blocking(move || parse_dataset_json(&body).map(Catalog::from_loaded))
        .await
        .context("dataset task failed")?
        .map_err(|e| {
            tracing::warn!(error = %e, "rejected uploaded dataset");
            e
        })?;
    let resp = LoadResponse { records: catalog.len(), skipped: catalog.skipped, tokens: catalog.index.len() };
    state.replace(catalog);
    tracing::info!(records = resp.records, skipped = resp.skipped, "dataset replaced");
    Ok(Json(resp))
}

pub async fn index_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<IndexParams>,
) -> Result<Json<IndexLookup>, ApiError> {
    let catalog = state.require_snapshot()?;
    let ids: Vec<RecordId> = if params.contains {
        catalog.index.lookup_containing(&token).into_iter().collect()
    } else {
        catalog.index.lookup(&token).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    };
    Ok(Json(IndexLookup { token, ids }))
}
