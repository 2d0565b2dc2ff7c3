//! Branch Protection for New Repositories
//!
//! When a repository is created, installs the default protection rule on the
//! configured branch and documents it in an issue that is closed right away.

use std::fmt::Write as _;

use tracing::info;
use warden_common::EventEnvelope;

use super::client::RepositoryApi;
use super::error::HandlerError;
use super::types::{BranchProtection, ProtectionRequest};

/// Branch used when neither configuration nor payload names one.
pub const FALLBACK_BRANCH: &str = "main";

/// Which branch of a new repository gets protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPolicy {
    /// Always this branch name.
    Fixed(String),
    /// `repository.default_branch` from the payload, else [`FALLBACK_BRANCH`].
    RepositoryDefault,
}

impl BranchPolicy {
    /// Policy for an optional configured branch name.
    pub fn from_config(branch: Option<&str>) -> Self {
        branch.map_or(Self::RepositoryDefault, |b| Self::Fixed(b.to_string()))
    }

    /// Branch name to protect for this event.
    pub fn resolve<'a>(&'a self, envelope: &'a EventEnvelope) -> &'a str {
        match self {
            Self::Fixed(branch) => branch,
            Self::RepositoryDefault => envelope
                .repository_default_branch()
                .unwrap_or(FALLBACK_BRANCH),
        }
    }
}

/// What [`protect_new_repository`] ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectionOutcome {
    /// A rule already existed; nothing was changed.
    AlreadyProtected,
    /// A rule was installed and documented in the given (closed) issue.
    Protected { issue_number: u64 },
}

/// Protect the branch of a newly created repository.
pub async fn protect_new_repository(
    api: &dyn RepositoryApi,
    envelope: &EventEnvelope,
    policy: &BranchPolicy,
) -> Result<ProtectionOutcome, HandlerError> {
    let repo = envelope.repository_full_name()?;
    let branch = policy.resolve(envelope);

    if api.branch_protection(repo, branch).await?.is_some() {
        info!(repo, branch, "Branch already protected, leaving it alone");
        return Ok(ProtectionOutcome::AlreadyProtected);
    }

    let protection = api
        .protect_branch(repo, branch, &ProtectionRequest::default_rule())
        .await?;
    info!(repo, branch, "Branch protection rule created");

    let body = render_issue_body(envelope.sender_login().ok(), branch, &protection);
    let issue = api
        .create_issue(repo, &format!("Setup branch protection for {branch}"), &body)
        .await?;
    api.close_issue(repo, issue.number).await?;

    info!(repo, issue = issue.number, "Branch protection documented");
    Ok(ProtectionOutcome::Protected {
        issue_number: issue.number,
    })
}

const fn checkbox(enabled: bool) -> &'static str {
    if enabled {
        ":white_check_mark:"
    } else {
        ":black_square_button:"
    }
}

/// One checklist entry: checkbox, bold label, italic explanation below it.
/// Nested entries are list items under the preceding top-level setting.
fn write_setting(body: &mut String, nested: bool, enabled: bool, label: &str, hint: &str) {
    let (bullet, indent) = if nested { ("- ", "  ") } else { ("", "") };
    let _ = writeln!(body, "{bullet}{} **{label}**", checkbox(enabled));
    let _ = writeln!(body, "{indent}_{hint}_\n");
}

/// Markdown summary of the rule as GitHub stored it.
pub fn render_issue_body(
    sender: Option<&str>,
    branch: &str,
    protection: &BranchProtection,
) -> String {
    let reviews = protection.required_pull_request_reviews.as_ref();
    let checks = protection.required_status_checks.as_ref();
    let mut body = String::new();

    match sender {
        Some(login) => {
            let _ = writeln!(body, "Hey @{login},\n");
        }
        None => body.push_str("Hey,\n\n"),
    }
    let _ = writeln!(
        body,
        "Congrats on starting the next big thing! :clap: :tada: :trophy:  \
         In order to help, a branch protection rule with the following settings \
         was created for the **{branch}** branch.\n\n---\n"
    );

    write_setting(
        &mut body,
        false,
        reviews.is_some(),
        "Require pull request reviews before merging",
        "When enabled, all commits must be made to a non-protected branch and submitted \
         via a pull request with the required number of approving reviews and no changes \
         requested before it can be merged into a branch that matches this rule.",
    );
    let _ = writeln!(
        body,
        "- **Required approving reviews**: {}\n",
        reviews.map_or_else(String::new, |r| r.required_approving_review_count.to_string())
    );
    write_setting(
        &mut body,
        true,
        reviews.is_some_and(|r| r.dismiss_stale_reviews),
        "Dismiss stale pull request approvals when new commits are pushed",
        "New reviewable commits pushed to a matching branch will dismiss pull request \
         review approvals.",
    );
    write_setting(
        &mut body,
        true,
        reviews.is_some_and(|r| r.require_code_owner_reviews),
        "Require review from Code Owners",
        "Require an approved review in pull requests including files with a designated \
         code owner.",
    );

    write_setting(
        &mut body,
        false,
        checks.is_some(),
        "Require status checks to pass before merging",
        "Choose which status checks must pass before branches can be merged into a branch \
         that matches this rule. When enabled, commits must first be pushed to another \
         branch, then merged or pushed directly to a branch that matches this rule after \
         status checks have passed.",
    );
    write_setting(
        &mut body,
        true,
        checks.is_some_and(|c| c.strict),
        "Require branches to be up to date before merging",
        "This ensures pull requests targeting a matching branch have been tested with the \
         latest code. This setting will not take effect unless at least one status check \
         is enabled (see below).",
    );

    for (enabled, label, hint) in [
        (
            protection.required_conversation_resolution.enabled,
            "Require conversation resolution before merging",
            "When enabled, all conversations on code must be resolved before a pull request \
             can be merged into a branch that matches this rule.",
        ),
        (
            protection.required_linear_history.enabled,
            "Require linear history",
            "Prevent merge commits from being pushed to matching branches.",
        ),
        (
            protection.enforce_admins.enabled,
            "Include administrators",
            "Enforce all configured restrictions above for administrators.",
        ),
        (
            protection.allow_force_pushes.enabled,
            "Allow force pushes",
            "Permit force pushes for all users with push access.",
        ),
        (
            protection.allow_deletions.enabled,
            "Allow deletions",
            "Allow users with push access to delete matching branches.",
        ),
    ] {
        write_setting(&mut body, false, enabled, label, hint);
    }

    body
}
