//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the webhook authentication pipeline.
///
/// Display strings are safe to return to callers: they never contain the
/// webhook secret, the private key, a signature or a token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body is not valid JSON.
    #[error("Request body is not valid JSON")]
    MalformedPayload,

    /// Signature header does not match the body.
    #[error("Signature does not match")]
    SignatureMismatch,

    /// Private key or App identifier is missing or invalid.
    #[error("Server misconfigured")]
    Configuration(String),

    /// Payload has no `installation.id`.
    #[error("Payload has no installation")]
    MissingInstallation,

    /// The platform refused or failed to issue an installation token.
    #[error("Installation token exchange failed")]
    TokenExchangeFailed(String),
}

impl AuthError {
    /// Machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::SignatureMismatch => "SIGNATURE_MISMATCH",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::MissingInstallation => "MISSING_INSTALLATION",
            Self::TokenExchangeFailed(_) => "TOKEN_EXCHANGE_FAILED",
        }
    }

    /// HTTP status returned for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload | Self::MissingInstallation => StatusCode::BAD_REQUEST,
            Self::SignatureMismatch => StatusCode::UNAUTHORIZED,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TokenExchangeFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
