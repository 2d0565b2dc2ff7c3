//! Branch Warden Server
//!
//! GitHub App webhook receiver. Every delivery is authenticated (HMAC
//! signature, App assertion, installation token) before any business action
//! runs; the only action today protects the branch of new repositories.

pub mod api;
pub mod auth;
pub mod config;
pub mod github;
pub mod webhooks;
