use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use internmatch_core::catalog::DEFAULT_EXPORT_LIMIT;
use internmatch_core::persist::{export_results, load_dataset_path, save_index, IndexPaths, MetaFile};
use internmatch_core::{find_matches, Catalog, MatchOptions, Profile, ScoredResult, VocabField, Weights};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

const INDEX_VERSION: u32 = 1;

#[derive(Parser)]
#[command(name = "internmatch")]
#[command(about = "Match a profile against internship postings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Dataset file or directory (.json / .jsonl)
    #[arg(long, env = "INTERNMATCH_DATASET")]
    input: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the vocabulary lists as JSON
    Vocab {
        #[command(flatten)]
        input: Input,
        /// Print only one list: education, sector, location or skills
        #[arg(long)]
        field: Option<VocabField>,
    },
    /// Print autocomplete suggestions for a partial entry
    Suggest {
        #[command(flatten)]
        input: Input,
        #[arg(long)]
        field: VocabField,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Rank postings for a profile
    Match {
        #[command(flatten)]
        input: Input,
        /// Comma-separated skill tokens, in order of entry
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long, default_value = "")]
        education: String,
        #[arg(long, default_value = "")]
        sector: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Score weights, e.g. skills=0.52,location=0.2,education=0.16,sector=0.12
        #[arg(long, env = "INTERNMATCH_WEIGHTS", default_value_t = Weights::DEFAULT)]
        weights: Weights,
        /// Ranked results to print
        #[arg(long, env = "INTERNMATCH_RESULT_LIMIT", default_value_t = 50)]
        top: usize,
        /// Score at most this many records
        #[arg(long, env = "INTERNMATCH_MAX_RECORDS")]
        max_records: Option<usize>,
        /// Also write the head of the ranking to this JSON file
        #[arg(long)]
        out: Option<PathBuf>,
        /// Results written by --out
        #[arg(long, default_value_t = DEFAULT_EXPORT_LIMIT)]
        export_top: usize,
    },
    /// Build the inverted index and write it to a directory
    Index {
        #[command(flatten)]
        input: Input,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Vocab { input, field } => {
            let catalog = open(&input)?;
            let json = match field {
                Some(f) => serde_json::to_string_pretty(catalog.vocabulary.field(f))?,
                None => serde_json::to_string_pretty(&catalog.vocabulary)?,
            };
            println!("{json}");
        }
        Commands::Suggest { input, field, query } => {
            let catalog = open(&input)?;
            println!("{}", serde_json::to_string_pretty(&catalog.vocabulary.suggest(field, &query))?);
        }
        Commands::Match { input, skills, education, sector, location, weights, top, max_records, out, export_top } => {
            let catalog = open(&input)?;
            let profile = Profile { skills, education, sector, location };
            let opts = MatchOptions { weights, limit: top, max_records };
            let results = run_match(&catalog, &profile, &opts, out.as_deref().map(|p| (p, export_top)))?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::Index { input, output } => {
            let catalog = open(&input)?;
            build_index(&catalog, &output)?;
        }
    }
    Ok(())
}

fn open(input: &Input) -> Result<Catalog> {
    let loaded = load_dataset_path(&input.input)
        .with_context(|| format!("Dataset load error: {}", input.input.display()))?;
    if loaded.skipped > 0 {
        tracing::warn!(skipped = loaded.skipped, "some dataset entries were not postings");
    }
    Ok(Catalog::from_loaded(loaded))
}

fn run_match(
    catalog: &Catalog,
    profile: &Profile,
    opts: &MatchOptions,
    export: Option<(&Path, usize)>,
) -> Result<Vec<ScoredResult>> {
    let results = find_matches(Some(catalog), profile, opts)?;
    if let Some((path, n)) = export {
        let head = &results[..n.min(results.len())];
        export_results(path, head)?;
        tracing::info!(path = %path.display(), exported = head.len(), "results exported");
    }
    Ok(results)
}

fn build_index(catalog: &Catalog, output: &Path) -> Result<MetaFile> {
    let paths = IndexPaths::new(output);
    let meta = MetaFile {
        num_records: catalog.len(),
        num_tokens: catalog.index.len(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: INDEX_VERSION,
    };
    save_index(&paths, &catalog.index, &meta)?;
    tracing::info!(output = %output.display(), tokens = meta.num_tokens, "index build complete");
    Ok(meta)
}
