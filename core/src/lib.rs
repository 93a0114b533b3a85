use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::cmp::Ordering;
use std::fmt;

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod expand;
pub mod index;
pub mod normalize;
pub mod persist;
pub mod rank;
pub mod score;
pub mod vocab;

pub use catalog::{find_matches, Catalog, MatchOptions};
pub use error::MatchError;
pub use index::InvertedIndex;
pub use score::Weights;
pub use vocab::{Vocabulary, VocabField};

/// Identifier of a posting. Serialized back in the shape it was read in.
///
/// Numeric ids keep the exact JSON number, so `1.5` stays `1.5`. Numbers sort
/// before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(Number),
    Text(String),
}

impl RecordId {
    pub fn num(n: i64) -> Self {
        RecordId::Num(Number::from(n))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RecordId::Num(a), RecordId::Num(b)) => {
                let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
                x.total_cmp(&y).then_with(|| a.to_string().cmp(&b.to_string()))
            }
            (RecordId::Num(_), RecordId::Text(_)) => Ordering::Less,
            (RecordId::Text(_), RecordId::Num(_)) => Ordering::Greater,
            (RecordId::Text(a), RecordId::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Integral floats print without a fraction (`1.0` -> `1`), matching how the
/// id reads in a JSON document produced by a browser.
impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => match n.as_f64() {
                Some(x) if n.is_f64() => write!(f, "{x}"),
                _ => write!(f, "{n}"),
            },
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self { RecordId::num(n) }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self { RecordId::Text(s.to_string()) }
}

/// One internship posting with every field filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub sector: String,
    pub education: String,
    pub skills: Vec<String>,
    pub description: String,
    pub stipend: String,
    pub duration: String,
}

/// A search query. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Skill tokens in entry order.
    pub skills: Vec<String>,
    pub education: String,
    pub sector: String,
    pub location: String,
}

impl Profile {
    /// True when nothing in the profile would constrain a match.
    pub fn is_empty(&self) -> bool {
        self.skills.iter().all(|s| normalize::normalize(s).is_empty())
            && normalize::normalize(&self.education).is_empty()
            && normalize::normalize(&self.sector).is_empty()
            && normalize::normalize(&self.location).is_empty()
    }
}

/// Per-factor sub-scores, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub skills: f64,
    pub location: f64,
    pub education: f64,
    pub sector: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub record: Record,
    /// Weighted sum plus the tie-break term, so it can slightly exceed 1.0.
    pub score: f64,
    pub breakdown: Breakdown,
}
