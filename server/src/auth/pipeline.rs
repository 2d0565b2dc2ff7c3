//! Webhook Authentication Pipeline
//!
//! Runs once per delivery, strictly in order:
//!
//! ```text
//! Received -> SignatureVerified -> AppAuthenticated -> InstallationAuthenticated -> Ready
//!     \______________\___________________\_______________________\____________-> Rejected
//! ```
//!
//! Nothing downstream of the pipeline ever sees an unverified body or an
//! unscoped client. No credential outlives the request that produced it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};
use zeroize::Zeroizing;

use super::error::{AuthError, AuthResult};
use super::installation::TokenBroker;
use super::jwt::AppIdentity;
use crate::github::InstallationClient;
use crate::webhooks::payload::{RawRequest, WebhookPayload};
use crate::webhooks::signing;

/// Pipeline stages, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    SignatureVerified,
    AppAuthenticated,
    InstallationAuthenticated,
    Ready,
    Rejected,
}

impl Stage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::SignatureVerified => "signature_verified",
            Self::AppAuthenticated => "app_authenticated",
            Self::InstallationAuthenticated => "installation_authenticated",
            Self::Ready => "ready",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug)]
pub struct AuthenticatedEvent {
    /// `X-GitHub-Event`, if the delivery named one.
    pub event_type: Option<String>,
    /// Verified and parsed payload.
    pub payload: WebhookPayload,
    /// Client scoped to the payload's installation.
    pub client: InstallationClient,
}

/// Read-only, process-wide authentication context.
pub struct AuthPipeline {
    identity: Arc<AppIdentity>,
    webhook_secret: Zeroizing<String>,
    broker: Arc<dyn TokenBroker>,
    http: reqwest::Client,
    api_url: String,
    exchange_timeout: Duration,
}

impl AuthPipeline {
    /// Default bound on the token exchange.
    pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a pipeline.
    ///
    /// `http` and `api_url` are used for the installation-scoped client handed
    /// to event handlers.
    pub fn new(
        identity: Arc<AppIdentity>,
        webhook_secret: impl Into<String>,
        broker: Arc<dyn TokenBroker>,
        http: reqwest::Client,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            webhook_secret: Zeroizing::new(webhook_secret.into()),
            broker,
            http,
            api_url: api_url.into(),
            exchange_timeout: Self::DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Set the bound on the token exchange.
    #[must_use]
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    /// Authenticate a delivery end to end.
    pub async fn authenticate(&self, request: RawRequest) -> AuthResult<AuthenticatedEvent> {
        let result = self.run(&request).await;
        if let Err(e) = &result {
            log_rejection(e);
        }
        result
    }

    async fn run(&self, request: &RawRequest) -> AuthResult<AuthenticatedEvent> {
        debug!(stage = %Stage::Received, bytes = request.body().len());

        signing::verify(request.body(), request.signature(), &self.webhook_secret)?;
        debug!(stage = %Stage::SignatureVerified);

        let payload = WebhookPayload::parse(request.body().clone())?;
        if let Some(action) = payload.envelope().action() {
            debug!(event = ?request.event_type(), action, "Received event");
        }

        let assertion = self.identity.mint_now()?;
        debug!(
            stage = %Stage::AppAuthenticated,
            expires_at = %assertion.expires_at()
        );

        let Ok(installation_id) = payload.envelope().installation_id() else {
            warn!(
                delivery_id = ?request.delivery_id(),
                event = ?request.event_type(),
                "Delivery missing installation payload"
            );
            return Err(AuthError::MissingInstallation);
        };

        let credential = tokio::time::timeout(
            self.exchange_timeout,
            self.broker.exchange(&assertion, installation_id),
        )
        .await
        .map_err(|_| {
            AuthError::TokenExchangeFailed(format!(
                "{} broker timed out after {:?}",
                self.broker.name(),
                self.exchange_timeout
            ))
        })??;
        debug!(
            stage = %Stage::InstallationAuthenticated,
            installation_id = %installation_id,
            token_expires_at = %credential.expires_at()
        );

        let client = InstallationClient::new(self.http.clone(), self.api_url.clone(), credential);
        debug!(stage = %Stage::Ready);

        Ok(AuthenticatedEvent {
            event_type: request.event_type().map(str::to_owned),
            payload,
            client,
        })
    }
}

fn log_rejection(e: &AuthError) {
    match e {
        AuthError::SignatureMismatch => {
            warn!(stage = %Stage::Rejected, code = e.code(), "Webhook signature mismatch");
        }
        AuthError::MalformedPayload | AuthError::MissingInstallation => {
            warn!(stage = %Stage::Rejected, code = e.code(), "Webhook rejected");
        }
        AuthError::Configuration(cause) | AuthError::TokenExchangeFailed(cause) => {
            error!(stage = %Stage::Rejected, code = e.code(), cause = %cause, "Webhook authentication failed");
        }
    }
}
