//! Event Handler Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use warden_common::MissingField;

use crate::auth::ErrorResponse;

/// Failure of a business action after authentication succeeded.
///
/// Kept apart from `AuthError` so logs and status codes never conflate the two.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload lacks a field the action needs.
    #[error(transparent)]
    MissingField(#[from] MissingField),

    /// Transport-level failure talking to GitHub.
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// `GITHUB_API_URL` cannot carry a request path.
    #[error("Invalid GitHub API URL: {0}")]
    InvalidApiUrl(String),

    /// GitHub answered with a non-success status.
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Event handler failed");

        let body = Json(ErrorResponse {
            error: "HANDLER_ERROR".to_string(),
            message: "Event handler failed".to_string(),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
