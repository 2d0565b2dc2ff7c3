//! GitHub Event Types
//!
//! Values of the `X-GitHub-Event` header the server knows about.

/// Webhook event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitHubEvent {
    /// Connectivity check sent when a webhook is configured.
    Ping,
    /// The App was installed, uninstalled, suspended, ...
    Installation,
    /// Repositories were added to or removed from an installation.
    InstallationRepositories,
    /// A repository was created, deleted, renamed, ...
    Repository,
}

impl GitHubEvent {
    /// Parse from the header value (e.g., `"repository"`).
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "ping" => Some(Self::Ping),
            "installation" => Some(Self::Installation),
            "installation_repositories" => Some(Self::InstallationRepositories),
            "repository" => Some(Self::Repository),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Installation => "installation",
            Self::InstallationRepositories => "installation_repositories",
            Self::Repository => "repository",
        }
    }
}

impl std::fmt::Display for GitHubEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
