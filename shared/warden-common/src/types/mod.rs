//! Shared Types

mod event;

pub use event::{EventEnvelope, InstallationId, InstallationRef, RepositoryRef, SenderRef};
