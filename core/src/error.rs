use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset is not loaded yet")]
    NotReady,

    #[error("enter at least skills, education, sector or location")]
    EmptyQuery,

    #[error("invalid weights: {0}")]
    InvalidWeights(String),
}

pub type Result<T> = std::result::Result<T, MatchError>;
