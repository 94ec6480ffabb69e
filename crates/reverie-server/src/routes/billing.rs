// crates/reverie-server/src/routes/billing.rs
// ============================================================================
// Module: Billing Webhook Route
// Description: Authenticated ingestion of provider billing events.
// Purpose: Verify, parse, and apply billing transitions exactly once.
// Dependencies: axum, crate::{error, state}, reverie-billing
// ============================================================================

//! ## Overview
//! The webhook endpoint verifies the raw-body signature before anything
//! else; an invalid signature is rejected with 400 and no transition is
//! attempted. Parsed events flow through the adapter, which drops unbindable
//! events and applies the rest idempotently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use reverie_billing::BillingEvent;
use reverie_billing::BillingOutcome;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// SECTION: Bodies
// ============================================================================

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    /// Whether the event was recognized and applied to an account.
    pub applied: bool,
    /// Stable outcome label.
    pub outcome: &'static str,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /billing/webhook` — ingest one provider event.
///
/// # Errors
///
/// Returns 400 on signature failure or a malformed handled event; store
/// failures surface as internal errors.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get("x-billing-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !state.webhook.verify(&body, signature) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_signature",
            "webhook signature verification failed",
        ));
    }
    let parsed = BillingEvent::from_json(&body).map_err(|error| {
        ApiError::new(StatusCode::BAD_REQUEST, "malformed_event", error.to_string())
    })?;
    let Some(event) = parsed else {
        return Ok(Json(WebhookAck { applied: false, outcome: "ignored_unhandled_kind" }));
    };
    let outcome = state.adapter.apply(&event, state.clock.now())?;
    let (applied, label) = match outcome {
        BillingOutcome::Applied { .. } => (true, "applied"),
        BillingOutcome::DroppedMissingAccount => (false, "dropped_missing_account"),
        BillingOutcome::DroppedUnknownAccount { .. } => (false, "dropped_unknown_account"),
    };
    Ok(Json(WebhookAck { applied, outcome: label }))
}
