//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for sending webhook deliveries through the full axum
//! router, plus a counting [`FakeBroker`] standing in for GitHub's token
//! exchange.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use warden_common::InstallationId;
use warden_server::api::{create_router, AppState};
use warden_server::auth::{
    AppAssertion, AppIdentity, AuthError, AuthPipeline, AuthResult, InstallationCredential,
    TokenBroker,
};
use warden_server::config::Config;
use warden_server::github::protection::BranchPolicy;
use warden_server::webhooks::dispatch::Dispatcher;
use warden_server::webhooks::signing::sign_payload;

/// Test App private key (2048-bit RSA, PKCS#1).
pub const PRIVATE_KEY: &str = include_str!("../fixtures/app_private_key.pem");

/// Matching public key, for verifying minted assertions.
pub const PUBLIC_KEY: &str = include_str!("../fixtures/app_public_key.pem");

/// Webhook secret of [`Config::default_for_test`].
pub const SECRET: &str = "s3cr3t";

// ============================================================================
// Fake token broker
// ============================================================================

/// Records every exchange and answers without touching the network.
pub struct FakeBroker {
    calls: Mutex<Vec<InstallationId>>,
    failure: Option<String>,
    delay: Option<StdDuration>,
}

impl FakeBroker {
    /// Broker that issues a one-hour token for every exchange.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
            delay: None,
        }
    }

    /// Broker that takes `delay` before answering.
    pub fn slow(delay: StdDuration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    /// Broker that fails every exchange with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
            delay: None,
        }
    }

    /// Installation ids seen so far, in call order.
    pub fn calls(&self) -> Vec<InstallationId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenBroker for FakeBroker {
    async fn exchange(
        &self,
        _assertion: &AppAssertion,
        installation_id: InstallationId,
    ) -> AuthResult<InstallationCredential> {
        self.calls.lock().unwrap().push(installation_id);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(AuthError::TokenExchangeFailed(message.clone()));
        }

        Ok(InstallationCredential::new(
            format!("ghs_fake_{installation_id}"),
            Utc::now() + Duration::hours(1),
            installation_id,
        ))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

// ============================================================================
// Test app
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub config: Arc<Config>,
    pub broker: Arc<FakeBroker>,
}

impl TestApp {
    /// Test app with the default test config and a succeeding broker.
    pub fn new() -> Self {
        Self::with_broker(Config::default_for_test(), FakeBroker::new())
    }

    /// Test app with a custom config (e.g., pointing at a mock API).
    pub fn with_config(config: Config) -> Self {
        Self::with_broker(config, FakeBroker::new())
    }

    pub fn with_broker(config: Config, broker: FakeBroker) -> Self {
        let broker = Arc::new(broker);
        let identity =
            AppIdentity::from_pem(&config.app_id, PRIVATE_KEY).expect("Fixture key must load");

        let pipeline = AuthPipeline::new(
            Arc::new(identity),
            config.webhook_secret.as_str(),
            broker.clone(),
            reqwest::Client::new(),
            config.api_url.clone(),
        )
        .with_exchange_timeout(config.token_exchange_timeout);
        let dispatcher = Dispatcher::new(BranchPolicy::from_config(
            config.protected_branch.as_deref(),
        ));

        let state = AppState::new(config.clone(), pipeline, dispatcher);
        let router = create_router(state);

        Self {
            router,
            config: Arc::new(config),
            broker,
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Sign `body` with `secret` and deliver it to `/event_handler`.
    pub async fn deliver(&self, event: Option<&str>, body: &str, secret: &str) -> Response<Body> {
        self.oneshot(delivery(event, body, Some(&sign_payload(secret, body.as_bytes()))))
            .await
    }
}

/// Build a webhook delivery request.
pub fn delivery(event: Option<&str>, body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = TestApp::request(Method::POST, "/event_handler")
        .header("content-type", "application/json")
        .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
    if let Some(event) = event {
        builder = builder.header("x-github-event", event);
    }
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature-256", signature);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build delivery")
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
