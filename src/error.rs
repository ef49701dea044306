use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors the HTTP boundary turns into client-facing responses.
///
/// Per-query fetch failures never show up here, they end up as empty slots.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing query parameters")]
    MissingQuery,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
