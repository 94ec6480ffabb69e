// crates/reverie-billing/src/event.rs
// ============================================================================
// Module: Billing Events
// Description: Provider event model for subscription lifecycle changes.
// Purpose: Parse webhook payloads into a closed event set.
// Dependencies: reverie-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The payment provider asserts subscription state through webhook events.
//! Only three shapes drive entitlement transitions: checkout completion,
//! subscription update/renewal, and cancellation. Every other event kind is
//! acknowledged and ignored so provider-side additions never break the
//! endpoint.
//!
//! The account reference is the only binding between an event and a record;
//! events without one are dropped, never matched heuristically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reverie_core::AccountId;
use reverie_core::Timestamp;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Billing payload errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Payload was not a valid event document.
    #[error("malformed billing event: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Event Model
// ============================================================================

/// Billing period tag attached to a completed checkout.
///
/// # Invariants
/// - Variants are stable for wire parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    /// One-month subscription period.
    Monthly,
    /// Twelve-month subscription period.
    Yearly,
}

/// Provider subscription status labels.
///
/// # Invariants
/// - Unrecognized labels map to [`ProviderStatus::Unknown`] and never grant
///   access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Subscription is paid up.
    Active,
    /// Subscription is inside a trial period.
    Trialing,
    /// Payment is overdue.
    PastDue,
    /// Subscription was canceled.
    Canceled,
    /// Payment failed terminally.
    Unpaid,
    /// Checkout never completed.
    Incomplete,
    /// Any label this version does not recognize.
    #[serde(other)]
    Unknown,
}

impl ProviderStatus {
    /// Returns true when the status keeps paid access.
    #[must_use]
    pub const fn grants_access(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Event kinds driving entitlement transitions.
///
/// # Invariants
/// - Variants carry exactly the fields their transition needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEventKind {
    /// Hosted checkout completed; expiry is computed from the period tag.
    CheckoutCompleted {
        /// Billing period chosen at checkout.
        period: BillingPeriod,
    },
    /// Subscription renewed or updated; expiry comes from the provider's
    /// own period end so re-delivery is idempotent.
    SubscriptionUpdated {
        /// Provider status label.
        status: ProviderStatus,
        /// Provider-supplied period end.
        current_period_end: Option<Timestamp>,
    },
    /// Subscription canceled.
    SubscriptionCanceled,
}

/// A parsed billing event.
///
/// # Invariants
/// - `account` is the only permitted record binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingEvent {
    /// Event kind with its transition fields.
    pub kind: BillingEventKind,
    /// Account reference, when the provider supplied one.
    pub account: Option<AccountId>,
}

// ============================================================================
// SECTION: Wire Parsing
// ============================================================================

/// Raw webhook document shape.
///
/// Unknown extra fields are tolerated; providers add fields freely.
#[derive(Debug, Deserialize)]
struct WireEvent {
    /// Event kind label.
    kind: String,
    /// Account reference.
    #[serde(default)]
    account_id: Option<String>,
    /// Billing period tag (checkout events).
    #[serde(default)]
    billing_period: Option<BillingPeriod>,
    /// Provider status label (subscription events).
    #[serde(default)]
    status: Option<ProviderStatus>,
    /// Period end in unix seconds (subscription events).
    #[serde(default)]
    current_period_end: Option<i64>,
}

impl BillingEvent {
    /// Parses a webhook body into an event.
    ///
    /// Returns `Ok(None)` for event kinds this authority does not handle;
    /// the endpoint acknowledges those without acting.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Malformed`] when the body is not a valid
    /// event document or a handled kind is missing a required field.
    pub fn from_json(body: &[u8]) -> Result<Option<Self>, BillingError> {
        let wire: WireEvent = serde_json::from_slice(body)
            .map_err(|error| BillingError::Malformed(error.to_string()))?;
        let account = wire.account_id.map(AccountId::new);
        let kind = match wire.kind.as_str() {
            "checkout_completed" => {
                let period = wire.billing_period.ok_or_else(|| {
                    BillingError::Malformed("checkout event missing billing_period".to_string())
                })?;
                BillingEventKind::CheckoutCompleted { period }
            }
            "subscription_updated" | "subscription_renewed" => {
                let status = wire.status.ok_or_else(|| {
                    BillingError::Malformed("subscription event missing status".to_string())
                })?;
                let current_period_end = wire
                    .current_period_end
                    .map(|seconds| Timestamp::from_unix_millis(seconds.saturating_mul(1_000)));
                BillingEventKind::SubscriptionUpdated { status, current_period_end }
            }
            "subscription_canceled" => BillingEventKind::SubscriptionCanceled,
            _ => return Ok(None),
        };
        Ok(Some(Self { kind, account }))
    }

    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self.kind {
            BillingEventKind::CheckoutCompleted { .. } => "checkout_completed",
            BillingEventKind::SubscriptionUpdated { .. } => "subscription_updated",
            BillingEventKind::SubscriptionCanceled => "subscription_canceled",
        }
    }
}
