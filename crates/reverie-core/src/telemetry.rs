// crates/reverie-core/src/telemetry.rs
// ============================================================================
// Module: Authority Telemetry
// Description: Observability hooks for decisions and billing transitions.
// Purpose: Provide audit events without hard observability dependencies.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! This module exposes a thin event interface for authorization decisions,
//! lazy expiry corrections, and billing event handling. It is intentionally
//! dependency-light so deployments can plug in their logging or metrics
//! stack without redesign. Telemetry must avoid leaking tokens or secrets;
//! events carry identifiers and stable labels only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::AccountId;
use crate::core::quota::ActionKind;
use crate::core::quota::DenyReason;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Authorization decision event payload.
///
/// # Invariants
/// - `deny_reason` is `None` exactly when `allowed` is true.
#[derive(Debug, Clone)]
pub struct DecisionEvent {
    /// Account the decision was made for.
    pub account_id: AccountId,
    /// Metered action kind.
    pub action: ActionKind,
    /// Whether the action was allowed.
    pub allowed: bool,
    /// Whether a successful completion consumes quota.
    pub consumes_quota: bool,
    /// Denial reason when denied.
    pub deny_reason: Option<DenyReason>,
}

/// Billing event handling outcome labels.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingDropReason {
    /// Event carried no account reference.
    MissingAccountRef,
    /// Event referenced an account with no record.
    UnknownAccount,
}

impl BillingDropReason {
    /// Returns a stable label for the drop reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingAccountRef => "missing_account_ref",
            Self::UnknownAccount => "unknown_account",
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Event sink for authority decisions and transitions.
pub trait AuthorityTelemetry: Send + Sync {
    /// Records an authorization decision.
    fn record_decision(&self, event: DecisionEvent);

    /// Records a lazy stale-paid correction.
    fn record_lazy_correction(&self, account: &AccountId);

    /// Records a billing event that was dropped without a transition.
    fn record_billing_drop(&self, reason: BillingDropReason);

    /// Records an applied billing transition with its stable kind label.
    fn record_billing_applied(&self, account: &AccountId, kind: &'static str);
}

/// No-op telemetry sink.
///
/// # Invariants
/// - Events are intentionally discarded.
pub struct NoopTelemetry;

impl AuthorityTelemetry for NoopTelemetry {
    fn record_decision(&self, _event: DecisionEvent) {}

    fn record_lazy_correction(&self, _account: &AccountId) {}

    fn record_billing_drop(&self, _reason: BillingDropReason) {}

    fn record_billing_applied(&self, _account: &AccountId, _kind: &'static str) {}
}
