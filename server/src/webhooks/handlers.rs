//! Webhook Receiver
//!
//! `POST /event_handler`: authenticate the delivery, then dispatch it.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::dispatch::DispatchOutcome;
use super::payload::RawRequest;
use crate::api::AppState;
use crate::auth::AuthError;
use crate::github::HandlerError;

/// Anything that can end a delivery early.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(e) => e.into_response(),
            Self::Handler(e) => e.into_response(),
        }
    }
}

/// Acknowledgement returned to GitHub.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// `"handled"` or `"ignored"`.
    pub status: &'static str,
}

/// Receive one webhook delivery.
pub async fn event_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<EventResponse>, WebhookError> {
    let request = RawRequest::new(headers, body);
    let delivery_id = request
        .delivery_id()
        .map_or_else(|| Uuid::now_v7().to_string(), str::to_owned);
    let span = info_span!(
        "webhook",
        delivery_id = %delivery_id,
        event = request.event_type().unwrap_or("-")
    );

    handle(state, request).instrument(span).await
}

async fn handle(state: AppState, request: RawRequest) -> Result<Json<EventResponse>, WebhookError> {
    let event = state.pipeline.authenticate(request).await?;

    let outcome = state
        .dispatcher
        .dispatch(
            event.event_type.as_deref(),
            event.payload.envelope(),
            &event.client,
        )
        .await?;

    let status = match outcome {
        DispatchOutcome::Ignored => "ignored",
        DispatchOutcome::BranchProtection(outcome) => {
            info!(?outcome, "Event handled");
            "handled"
        }
    };
    Ok(Json(EventResponse { status }))
}
