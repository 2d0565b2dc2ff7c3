//! Installation Token Exchange
//!
//! Trades an App assertion for an installation access token. The broker makes
//! exactly one attempt; retry policy, if any, belongs to the caller.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use warden_common::InstallationId;
use zeroize::Zeroizing;

use super::error::{AuthError, AuthResult};
use super::jwt::AppAssertion;
use crate::github::{with_api_headers, ERROR_BODY_PREVIEW};

/// Bearer token scoped to a single installation.
///
/// Owned by one request and dropped with it; never cached.
pub struct InstallationCredential {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
    installation_id: InstallationId,
}

impl InstallationCredential {
    pub fn new(
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
        installation_id: InstallationId,
    ) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            expires_at,
            installation_id,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub const fn installation_id(&self) -> InstallationId {
        self.installation_id
    }
}

impl fmt::Debug for InstallationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationCredential")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("installation_id", &self.installation_id)
            .finish()
    }
}

/// Exchanges App assertions for installation credentials.
#[async_trait]
pub trait TokenBroker: Send + Sync {
    /// Request an installation access token.
    ///
    /// Every failure is reported as [`AuthError::TokenExchangeFailed`].
    async fn exchange(
        &self,
        assertion: &AppAssertion,
        installation_id: InstallationId,
    ) -> AuthResult<InstallationCredential>;

    /// Returns the broker name for logging.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Token broker backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubTokenBroker {
    api_url: String,
    http: reqwest::Client,
}

impl GitHubTokenBroker {
    /// Create a broker for the given API base URL.
    pub fn new(api_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            api_url: api_url.into(),
            http,
        }
    }

    fn endpoint(&self, installation_id: InstallationId) -> String {
        format!(
            "{}/app/installations/{}/access_tokens",
            self.api_url.trim_end_matches('/'),
            installation_id
        )
    }
}

#[async_trait]
impl TokenBroker for GitHubTokenBroker {
    async fn exchange(
        &self,
        assertion: &AppAssertion,
        installation_id: InstallationId,
    ) -> AuthResult<InstallationCredential> {
        if assertion.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenExchangeFailed(format!(
                "App assertion expired at {}",
                assertion.expires_at()
            )));
        }

        let response = with_api_headers(self.http.post(self.endpoint(installation_id)))
            .bearer_auth(assertion.token())
            .send()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            warn!(
                installation_id = %installation_id,
                status = status.as_u16(),
                "Installation token request rejected"
            );
            return Err(AuthError::TokenExchangeFailed(format!(
                "HTTP {}: {preview}",
                status.as_u16()
            )));
        }

        let payload: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(format!("invalid token response: {e}")))?;

        debug!(
            installation_id = %installation_id,
            expires_at = %payload.expires_at,
            "Installation token issued"
        );

        Ok(InstallationCredential::new(
            payload.token,
            payload.expires_at,
            installation_id,
        ))
    }

    fn name(&self) -> &'static str {
        "github"
    }
}
