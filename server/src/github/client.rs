//! Installation-Scoped API Client

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use tracing::debug;
use warden_common::InstallationId;

use super::error::HandlerError;
use super::types::{
    BranchProtection, CreateIssueRequest, Issue, ProtectionRequest, UpdateIssueStateRequest,
};
use super::{with_api_headers, ERROR_BODY_PREVIEW};
use crate::auth::InstallationCredential;

/// Repository operations needed by the event handlers.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// Current protection of `branch`, or `None` when the branch is unprotected.
    async fn branch_protection(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, HandlerError>;

    /// Create or replace the protection rule of `branch`.
    async fn protect_branch(
        &self,
        repo: &str,
        branch: &str,
        rule: &ProtectionRequest,
    ) -> Result<BranchProtection, HandlerError>;

    async fn create_issue(&self, repo: &str, title: &str, body: &str)
        -> Result<Issue, HandlerError>;

    async fn close_issue(&self, repo: &str, number: u64) -> Result<(), HandlerError>;
}

/// API client bound to exactly one installation credential.
///
/// Constructed by the authentication pipeline and dropped at the end of the
/// request together with its credential.
#[derive(Debug)]
pub struct InstallationClient {
    http: reqwest::Client,
    api_url: String,
    credential: InstallationCredential,
}

impl InstallationClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        credential: InstallationCredential,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            credential,
        }
    }

    pub const fn installation_id(&self) -> InstallationId {
        self.credential.installation_id()
    }

    pub const fn credential(&self) -> &InstallationCredential {
        &self.credential
    }

    /// Append `segments` to the API base URL, percent-encoding each one.
    ///
    /// Branch names may contain `/`, `#`, `?` or `%`; each must stay a single
    /// path segment.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, HandlerError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| HandlerError::InvalidApiUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| HandlerError::InvalidApiUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        with_api_headers(self.http.request(method, url)).bearer_auth(self.credential.token())
    }
}

/// `["repos", owner, name]`, keeping the owner and name as separate segments.
fn repo_segments(repo: &str) -> impl Iterator<Item = &str> {
    std::iter::once("repos").chain(repo.splitn(2, '/'))
}

/// Turn a non-success response into [`HandlerError::Api`].
async fn check(response: Response) -> Result<Response, HandlerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(HandlerError::Api {
        status: status.as_u16(),
        message: body.chars().take(ERROR_BODY_PREVIEW).collect(),
    })
}

#[async_trait]
impl RepositoryApi for InstallationClient {
    async fn branch_protection(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, HandlerError> {
        let response = self
            .request(
                reqwest::Method::GET,
                self.url(repo_segments(repo).chain(["branches", branch, "protection"]))?,
            )
            .send()
            .await?;

        // GitHub answers 404 "Branch not protected" for unprotected branches.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(repo, branch, "Branch is not protected");
            return Ok(None);
        }

        Ok(Some(check(response).await?.json().await?))
    }

    async fn protect_branch(
        &self,
        repo: &str,
        branch: &str,
        rule: &ProtectionRequest,
    ) -> Result<BranchProtection, HandlerError> {
        let response = self
            .request(
                reqwest::Method::PUT,
                self.url(repo_segments(repo).chain(["branches", branch, "protection"]))?,
            )
            .json(rule)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<Issue, HandlerError> {
        let response = self
            .request(
                reqwest::Method::POST,
                self.url(repo_segments(repo).chain(["issues"]))?,
            )
            .json(&CreateIssueRequest { title, body })
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    async fn close_issue(&self, repo: &str, number: u64) -> Result<(), HandlerError> {
        let response = self
            .request(
                reqwest::Method::PATCH,
                self.url(repo_segments(repo).chain(["issues", &number.to_string()]))?,
            )
            .json(&UpdateIssueStateRequest { state: "closed" })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }
}
