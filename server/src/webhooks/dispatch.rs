//! Webhook Event Dispatch
//!
//! Maps `(event, action)` pairs to business actions. Pairs without an entry
//! are acknowledged and ignored.

use tracing::{debug, info};
use warden_common::EventEnvelope;

use super::events::GitHubEvent;
use crate::github::protection::{protect_new_repository, BranchPolicy, ProtectionOutcome};
use crate::github::{HandlerError, RepositoryApi};

/// Business actions the server can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Protect the branch of a freshly created repository.
    ProtectNewRepository,
}

/// Dispatch table.
const ROUTES: &[(GitHubEvent, &str, Route)] = &[(
    GitHubEvent::Repository,
    "created",
    Route::ProtectNewRepository,
)];

/// Look up the route for an event/action pair.
pub fn route(event: Option<&str>, action: Option<&str>) -> Option<Route> {
    let event = GitHubEvent::parse_str(event?)?;
    let action = action?;
    ROUTES
        .iter()
        .find(|(e, a, _)| *e == event && *a == action)
        .map(|(_, _, route)| *route)
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No route for this event/action pair.
    Ignored,
    /// Branch protection handler ran.
    BranchProtection(ProtectionOutcome),
}

/// Runs business actions for authenticated events.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    branch_policy: BranchPolicy,
}

impl Dispatcher {
    pub const fn new(branch_policy: BranchPolicy) -> Self {
        Self { branch_policy }
    }

    /// Dispatch an event using the installation-scoped `api`.
    pub async fn dispatch(
        &self,
        event: Option<&str>,
        envelope: &EventEnvelope,
        api: &dyn RepositoryApi,
    ) -> Result<DispatchOutcome, HandlerError> {
        let Some(route) = route(event, envelope.action()) else {
            debug!(event, action = envelope.action(), "No handler for event");
            return Ok(DispatchOutcome::Ignored);
        };

        info!(?route, event, "Dispatching event");
        match route {
            Route::ProtectNewRepository => {
                protect_new_repository(api, envelope, &self.branch_policy)
                    .await
                    .map(DispatchOutcome::BranchProtection)
            }
        }
    }
}
