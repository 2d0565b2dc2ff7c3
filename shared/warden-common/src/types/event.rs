//! Webhook Event Envelope
//!
//! The narrow, typed view over a webhook payload that the server relies on.
//! Everything else in the document stays in the raw JSON value.

use std::fmt;

use serde_json::Value;

use crate::error::{MissingField, Result};

/// GitHub App installation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstallationId(pub u64);

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `installation` object of a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRef {
    /// Installation ID.
    pub id: InstallationId,
}

/// `repository` object of a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// `owner/name`.
    pub full_name: String,
    /// Default branch as declared by the payload.
    pub default_branch: Option<String>,
}

/// `sender` object of a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderRef {
    /// Login of the user that triggered the event.
    pub login: String,
}

/// Typed projection of the fields the server reads from a webhook payload.
///
/// Built once per request with [`EventEnvelope::project`]. Lookups of absent
/// fields return [`MissingField`] instead of a null-like value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventEnvelope {
    /// `action` (e.g. `"created"`); absent for some events such as `push`.
    pub action: Option<String>,
    pub installation: Option<InstallationRef>,
    pub repository: Option<RepositoryRef>,
    pub sender: Option<SenderRef>,
}

impl EventEnvelope {
    /// Extract the typed view from a parsed payload.
    ///
    /// Fields with an unexpected JSON type are treated as absent, so a
    /// malformed `installation` object surfaces later as a missing
    /// `installation.id` rather than as a parse failure.
    #[must_use]
    pub fn project(payload: &Value) -> Self {
        let str_at = |pointer: &str| {
            payload
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        let installation = payload
            .pointer("/installation/id")
            .and_then(Value::as_u64)
            .map(|id| InstallationRef {
                id: InstallationId(id),
            });

        let repository = str_at("/repository/full_name").map(|full_name| RepositoryRef {
            full_name,
            default_branch: str_at("/repository/default_branch"),
        });

        let sender = str_at("/sender/login").map(|login| SenderRef { login });

        Self {
            action: str_at("/action"),
            installation,
            repository,
            sender,
        }
    }

    /// Action name, if the payload carries one.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// `installation.id`.
    pub fn installation_id(&self) -> Result<InstallationId> {
        self.installation
            .as_ref()
            .map(|i| i.id)
            .ok_or(MissingField::new("installation.id"))
    }

    /// `repository.full_name`.
    pub fn repository_full_name(&self) -> Result<&str> {
        self.repository
            .as_ref()
            .map(|r| r.full_name.as_str())
            .ok_or(MissingField::new("repository.full_name"))
    }

    /// `repository.default_branch`.
    pub fn repository_default_branch(&self) -> Result<&str> {
        self.repository
            .as_ref()
            .and_then(|r| r.default_branch.as_deref())
            .ok_or(MissingField::new("repository.default_branch"))
    }

    /// `sender.login`.
    pub fn sender_login(&self) -> Result<&str> {
        self.sender
            .as_ref()
            .map(|s| s.login.as_str())
            .ok_or(MissingField::new("sender.login"))
    }
}
