use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use internmatch_core::MatchError;
use serde_json::json;
use thiserror::Error;

/// Handler error. Implements `IntoResponse` so handlers can return `Result<T, ApiError>`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Match(MatchError::NotReady) => {
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_READY", self.to_string())
            }
            ApiError::Match(MatchError::EmptyQuery | MatchError::InvalidWeights(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            ApiError::Match(MatchError::Dataset(_) | MatchError::Json(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_DATASET", self.to_string())
            }
            ApiError::Match(MatchError::Io(e)) => {
                tracing::error!("io error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR", "An I/O error occurred".to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
