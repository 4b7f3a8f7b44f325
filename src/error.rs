//! Error taxonomy for the PUDO gateway.
//!
//! Every failure surfaced over HTTP maps to one of four variants. Validation
//! failures are detected before any outbound call; carrier errors keep the
//! upstream message and error level verbatim because operators match on the
//! carrier's error text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or malformed; no network call was made.
    #[error("{0}")]
    Validation(String),

    /// The referenced order does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// Network-level failure talking to the carrier or the order system.
    #[error("{0}")]
    Transport(String),

    /// The carrier responded but signaled a business error.
    #[error("XBS API Error (Level {level}): {message}")]
    Carrier { level: i64, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Transport(_) | ApiError::Carrier { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}
