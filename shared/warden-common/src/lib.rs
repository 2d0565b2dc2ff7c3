//! Branch Warden Common Library
//!
//! Typed views over GitHub webhook payloads, shared by the server and tooling.

pub mod error;
pub mod types;

pub use error::{MissingField, Result};
pub use types::*;
