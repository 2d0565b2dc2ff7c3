//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use zeroize::Zeroizing;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3000")
    pub bind_address: String,

    /// GitHub App identifier, used as the `iss` claim of App assertions
    pub app_id: String,

    /// App private key (PEM, PEM with `\n` escapes, or base64-encoded PEM)
    pub private_key: Zeroizing<String>,

    /// Shared secret used to sign webhook deliveries
    pub webhook_secret: Zeroizing<String>,

    /// GitHub REST API base URL
    pub api_url: String,

    /// Branch to protect on new repositories (None = repository default branch)
    pub protected_branch: Option<String>,

    /// Upper bound on the installation token exchange (default: 10s)
    pub token_exchange_timeout: Duration,

    /// Maximum accepted webhook body in bytes (default: 25MB)
    pub max_payload_size: usize,

    /// Upper bound on handling one delivery end to end (default: 30s)
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            app_id: env::var("GITHUB_APP_IDENTIFIER")
                .context("GITHUB_APP_IDENTIFIER must be set")?,
            private_key: Zeroizing::new(
                env::var("GITHUB_PRIVATE_KEY").context("GITHUB_PRIVATE_KEY must be set")?,
            ),
            webhook_secret: Zeroizing::new(
                env::var("GITHUB_WEBHOOK_SECRET").context("GITHUB_WEBHOOK_SECRET must be set")?,
            ),
            api_url: env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into()),
            protected_branch: env::var("PROTECTED_BRANCH")
                .ok()
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty()),
            token_exchange_timeout: Duration::from_secs(
                env::var("TOKEN_EXCHANGE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            max_payload_size: env::var("MAX_PAYLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(25 * 1024 * 1024), // 25MB
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }

    /// Create a default configuration for testing.
    ///
    /// The private key is left empty; tests load the fixture key themselves.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".into(),
            app_id: "12345".into(),
            private_key: Zeroizing::new(String::new()),
            webhook_secret: Zeroizing::new("s3cr3t".into()),
            api_url: "http://127.0.0.1:9".into(),
            protected_branch: Some("main".into()),
            token_exchange_timeout: Duration::from_secs(2),
            max_payload_size: 25 * 1024 * 1024,
            request_timeout: Duration::from_secs(5),
        }
    }
}
