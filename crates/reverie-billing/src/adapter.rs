// crates/reverie-billing/src/adapter.rs
// ============================================================================
// Module: Billing Event Adapter
// Description: Translate provider events into entitlement transitions.
// Purpose: Apply billing-driven plan changes exactly once per event.
// Dependencies: crate::event, reverie-core, time
// ============================================================================

//! ## Overview
//! The adapter maps each handled billing event onto one entitlement update
//! intent. Renewal transitions are state-setting and derive expiry from the
//! event's own period-end field, so re-delivered events leave the record in
//! the same state as a single delivery.
//!
//! Events without an account reference, and events referencing an unknown
//! account, are recorded through telemetry and dropped. Billing can never
//! touch roles; the update intents it emits have no role surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use reverie_core::AccountId;
use reverie_core::AuthorityError;
use reverie_core::AuthorityStore;
use reverie_core::EntitlementRecord;
use reverie_core::EntitlementUpdate;
use reverie_core::GrantChannel;
use reverie_core::StoreError;
use reverie_core::Timestamp;
use reverie_core::add_calendar_months;
use reverie_core::telemetry::AuthorityTelemetry;
use reverie_core::telemetry::BillingDropReason;
use time::UtcOffset;

use crate::event::BillingEvent;
use crate::event::BillingEventKind;
use crate::event::BillingPeriod;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Outcome of applying one billing event.
///
/// # Invariants
/// - Dropped outcomes leave every record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingOutcome {
    /// The transition was applied to the account.
    Applied {
        /// Account the transition was applied to.
        account: AccountId,
        /// Resulting entitlement record.
        record: EntitlementRecord,
    },
    /// The event carried no account reference.
    DroppedMissingAccount,
    /// The event referenced an account with no record.
    DroppedUnknownAccount {
        /// The unmatched reference.
        account: AccountId,
    },
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Adapter from provider events to entitlement transitions.
///
/// # Invariants
/// - One event maps to at most one update intent.
/// - Account binding uses the explicit reference only; no heuristic
///   matching (for example by email) is ever attempted.
pub struct BillingEventAdapter {
    /// Record store shared with the rest of the authority.
    store: Arc<dyn AuthorityStore>,
    /// Telemetry sink for applied and dropped events.
    telemetry: Arc<dyn AuthorityTelemetry>,
    /// Fixed server-local offset for calendar expiry computation.
    week_offset: UtcOffset,
}

impl BillingEventAdapter {
    /// Creates an adapter over the given store and telemetry sink.
    #[must_use]
    pub fn new(
        store: Arc<dyn AuthorityStore>,
        telemetry: Arc<dyn AuthorityTelemetry>,
        week_offset: UtcOffset,
    ) -> Self {
        Self { store, telemetry, week_offset }
    }

    /// Applies one billing event.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError`] on store failure or an unrepresentable
    /// expiry instant; dropped events are outcomes, not errors.
    pub fn apply(
        &self,
        event: &BillingEvent,
        now: Timestamp,
    ) -> Result<BillingOutcome, AuthorityError> {
        let Some(account) = event.account.as_ref() else {
            self.telemetry.record_billing_drop(BillingDropReason::MissingAccountRef);
            return Ok(BillingOutcome::DroppedMissingAccount);
        };
        let update = self.transition_for(event, now)?;
        match self.store.apply_entitlement_update(account, &update) {
            Ok(record) => {
                self.telemetry.record_billing_applied(account, event.kind_label());
                Ok(BillingOutcome::Applied { account: account.clone(), record })
            }
            Err(StoreError::AccountNotFound(_)) => {
                self.telemetry.record_billing_drop(BillingDropReason::UnknownAccount);
                Ok(BillingOutcome::DroppedUnknownAccount { account: account.clone() })
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Maps an event onto its entitlement update intent.
    fn transition_for(
        &self,
        event: &BillingEvent,
        now: Timestamp,
    ) -> Result<EntitlementUpdate, AuthorityError> {
        match &event.kind {
            BillingEventKind::CheckoutCompleted { period } => {
                let months = match period {
                    BillingPeriod::Monthly => 1,
                    BillingPeriod::Yearly => 12,
                };
                let expires_at = add_calendar_months(now, months, self.week_offset)?;
                Ok(EntitlementUpdate::GrantDeep { expires_at, channel: GrantChannel::Billing })
            }
            BillingEventKind::SubscriptionUpdated { status, current_period_end } => {
                // A period end is required to keep access: an active status
                // without one cannot produce a bounded paid plan, so the
                // account falls back to free rather than gaining an open-ended
                // entitlement.
                match current_period_end {
                    Some(expires_at) if status.grants_access() => {
                        Ok(EntitlementUpdate::RenewDeep { expires_at: *expires_at })
                    }
                    _ => Ok(EntitlementUpdate::Downgrade { channel: GrantChannel::Billing }),
                }
            }
            BillingEventKind::SubscriptionCanceled => {
                Ok(EntitlementUpdate::Downgrade { channel: GrantChannel::Billing })
            }
        }
    }
}
