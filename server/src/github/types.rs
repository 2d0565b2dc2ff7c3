//! GitHub API Types
//!
//! Only the fields the server reads or writes are modelled.

use serde::{Deserialize, Serialize};

/// `{"enabled": bool}` wrapper used by several protection settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub enabled: bool,
}

/// Pull request review requirements of a protection rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviews {
    #[serde(default)]
    pub dismiss_stale_reviews: bool,
    #[serde(default)]
    pub require_code_owner_reviews: bool,
    #[serde(default)]
    pub required_approving_review_count: u32,
}

/// Status check requirements of a protection rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChecks {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub contexts: Vec<String>,
}

/// Branch protection as returned by
/// `GET /repos/{owner}/{repo}/branches/{branch}/protection`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_status_checks: Option<StatusChecks>,
    #[serde(default)]
    pub required_pull_request_reviews: Option<PullRequestReviews>,
    #[serde(default)]
    pub enforce_admins: Toggle,
    #[serde(default)]
    pub required_linear_history: Toggle,
    #[serde(default)]
    pub allow_force_pushes: Toggle,
    #[serde(default)]
    pub allow_deletions: Toggle,
    #[serde(default)]
    pub required_conversation_resolution: Toggle,
}

/// Body of `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.
///
/// GitHub requires `required_status_checks` and `restrictions` to be present,
/// so `None` serializes as `null` rather than being skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionRequest {
    pub required_status_checks: Option<StatusChecks>,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<PullRequestReviews>,
    pub restrictions: Option<serde_json::Value>,
}

impl ProtectionRequest {
    /// Rule installed on new repositories: admins included, two approving
    /// reviews, code owner review, stale approvals dismissed.
    #[must_use]
    pub fn default_rule() -> Self {
        Self {
            required_status_checks: None,
            enforce_admins: true,
            required_pull_request_reviews: Some(PullRequestReviews {
                dismiss_stale_reviews: true,
                require_code_owner_reviews: true,
                required_approving_review_count: 2,
            }),
            restrictions: None,
        }
    }
}

/// Issue as returned by the issues API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateIssueStateRequest {
    pub state: &'static str,
}
