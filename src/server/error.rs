use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::quotes::QuoteError;

/// Errors surfaced by the JSON endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("quote service unavailable: {0}")]
    QuoteUnavailable(#[from] QuoteError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownCity(_) => StatusCode::NOT_FOUND,
            ApiError::QuoteUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            warn!("Request failed: {}", message);
        } else {
            debug!("Rejected request: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
