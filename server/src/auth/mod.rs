//! Webhook Authentication
//!
//! Verifies that deliveries come from GitHub, proves the App's identity and
//! obtains a credential scoped to the installation that triggered the event.

mod error;
pub mod installation;
pub mod jwt;
pub mod pipeline;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use installation::{GitHubTokenBroker, InstallationCredential, TokenBroker};
pub use jwt::{AppAssertion, AppIdentity};
pub use pipeline::{AuthPipeline, AuthenticatedEvent, Stage};
