use crate::dataset::LoadedDataset;
use crate::error::{MatchError, Result};
use crate::index::InvertedIndex;
use crate::rank::{rank, top_k};
use crate::score::{score, Weights};
use crate::vocab::Vocabulary;
use crate::{Profile, Record, ScoredResult};
use std::time::Instant;

/// Results kept after ranking unless the caller asks otherwise.
pub const DEFAULT_RESULT_LIMIT: usize = 50;
/// Results written by an export.
pub const DEFAULT_EXPORT_LIMIT: usize = 10;

/// Immutable snapshot of one dataset load: the records plus everything derived from them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub records: Vec<Record>,
    pub vocabulary: Vocabulary,
    pub index: InvertedIndex,
    /// Raw entries dropped during the load.
    pub skipped: usize,
}

impl Catalog {
    pub fn build(records: Vec<Record>) -> Self {
        let vocabulary = Vocabulary::build(&records);
        let index = InvertedIndex::build(&records);
        tracing::info!(
            records = records.len(),
            skills = vocabulary.skills.len(),
            tokens = index.len(),
            "catalog built"
        );
        Self { records, vocabulary, index, skipped: 0 }
    }

    pub fn from_loaded(loaded: LoadedDataset) -> Self {
        let mut catalog = Self::build(loaded.records);
        catalog.skipped = loaded.skipped;
        catalog
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub weights: Weights,
    /// Keep at most this many ranked results.
    pub limit: usize,
    /// Score only the first N records of the catalog.
    pub max_records: Option<usize>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self { weights: Weights::DEFAULT, limit: DEFAULT_RESULT_LIMIT, max_records: None }
    }
}

/// Validate the query, score it against `catalog`, and return the ranked head.
///
/// `None` means no dataset has been loaded yet.
pub fn find_matches(catalog: Option<&Catalog>, profile: &Profile, opts: &MatchOptions) -> Result<Vec<ScoredResult>> {
    let catalog = catalog.ok_or(MatchError::NotReady)?;
    if profile.is_empty() {
        return Err(MatchError::EmptyQuery);
    }
    opts.weights.validate()?;

    let start = Instant::now();
    let records = match opts.max_records {
        Some(cap) => &catalog.records[..cap.min(catalog.records.len())],
        None => &catalog.records[..],
    };
    let scored = score(profile, records, &catalog.vocabulary.skills, &opts.weights);
    let ranked = top_k(rank(scored), opts.limit);
    tracing::debug!(
        scored = records.len(),
        returned = ranked.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "query scored"
    );
    Ok(ranked)
}
