//! GitHub REST API Access
//!
//! HTTP plumbing shared by the token broker and the installation-scoped
//! client, plus the repository actions triggered by webhook events.

mod client;
mod error;
pub mod protection;
pub mod types;

use std::time::Duration;

use reqwest::RequestBuilder;

pub use client::{InstallationClient, RepositoryApi};
pub use error::HandlerError;

/// Media type requested from the REST API.
pub const ACCEPT: &str = "application/vnd.github+json";

/// REST API version pinned for every request.
pub const API_VERSION: &str = "2022-11-28";

/// User-Agent sent with every request (GitHub rejects requests without one).
pub const USER_AGENT: &str = concat!("branch-warden/", env!("CARGO_PKG_VERSION"));

/// Maximum number of characters of an error body kept for logs.
pub const ERROR_BODY_PREVIEW: usize = 500;

/// Attach the headers GitHub expects on every REST call.
pub fn with_api_headers(request: RequestBuilder) -> RequestBuilder {
    request
        .header(reqwest::header::ACCEPT, ACCEPT)
        .header("X-GitHub-Api-Version", API_VERSION)
}

/// Build the HTTP client shared by all requests.
///
/// `reqwest::Client` pools connections internally and is cheap to clone.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(5))
        .timeout(timeout)
        .build()
}
