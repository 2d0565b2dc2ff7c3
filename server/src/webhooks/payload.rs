//! Raw Deliveries and Parsed Payloads

use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::Value;
use warden_common::EventEnvelope;

use crate::auth::{AuthError, AuthResult};

/// Signature header (HMAC-SHA256).
pub const SIGNATURE_256_HEADER: &str = "x-hub-signature-256";

/// Legacy signature header, consulted only when the SHA-256 one is absent.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Event name header.
pub const EVENT_HEADER: &str = "x-github-event";

/// Delivery GUID header.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// A delivery exactly as received: buffered body plus headers.
#[derive(Debug, Clone)]
pub struct RawRequest {
    headers: HeaderMap,
    body: Bytes,
}

impl RawRequest {
    pub const fn new(headers: HeaderMap, body: Bytes) -> Self {
        Self { headers, body }
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Signature header value, preferring `X-Hub-Signature-256`.
    pub fn signature(&self) -> Option<&str> {
        self.header(SIGNATURE_256_HEADER)
            .or_else(|| self.header(SIGNATURE_HEADER))
    }

    /// `X-GitHub-Event`, if present.
    pub fn event_type(&self) -> Option<&str> {
        self.header(EVENT_HEADER)
    }

    /// `X-GitHub-Delivery`, if present.
    pub fn delivery_id(&self) -> Option<&str> {
        self.header(DELIVERY_HEADER)
    }
}

/// Parsed JSON payload, kept together with the bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct WebhookPayload {
    raw: Bytes,
    value: Value,
    envelope: EventEnvelope,
}

impl WebhookPayload {
    /// Parse a body and extract its typed envelope.
    pub fn parse(raw: Bytes) -> AuthResult<Self> {
        let value: Value = serde_json::from_slice(&raw).map_err(|e| {
            tracing::debug!(error = %e, "Webhook body is not JSON");
            AuthError::MalformedPayload
        })?;
        let envelope = EventEnvelope::project(&value);

        Ok(Self {
            raw,
            value,
            envelope,
        })
    }

    /// Bytes exactly as delivered.
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }

    pub const fn envelope(&self) -> &EventEnvelope {
        &self.envelope
    }
}
