//! GitHub Webhooks
//!
//! Delivery parsing, HMAC verification, and routing of authenticated events
//! to business actions.

pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod payload;
pub mod signing;
