use crate::ScoredResult;

/// Sort by total score, best first. The tie-break term already folded into
/// each score keeps the order reproducible, so no secondary key is used.
pub fn rank(mut results: Vec<ScoredResult>) -> Vec<ScoredResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

pub fn top_k(mut results: Vec<ScoredResult>, k: usize) -> Vec<ScoredResult> {
    results.truncate(k);
    results
}
