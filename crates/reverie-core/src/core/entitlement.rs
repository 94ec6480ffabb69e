// crates/reverie-core/src/core/entitlement.rs
// ============================================================================
// Module: Reverie Entitlement State Machine
// Description: Per-account plan state, usage counters, and update intents.
// Purpose: Capture deterministic entitlement evolution for quota decisions.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! The entitlement record is the single mutable shared resource of the
//! authority. Transitions are expressed as a closed set of update intents,
//! each mapping deterministically to a fixed field set; stores persist the
//! result of [`EntitlementRecord::apply`] rather than ad hoc field patches.
//!
//! A paid plan whose expiry has passed is a transient stale state. It is
//! corrected lazily on the next read that feeds a decision, never by a
//! background sweep; see [`EntitlementRecord::needs_lazy_correction`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Plans
// ============================================================================

/// Stored plan tier.
///
/// # Invariants
/// - Variants are stable for serialization and store round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier with lifetime-capped metered actions.
    Free,
    /// Paid tier with an expiry instant.
    Deep,
}

impl Plan {
    /// Returns a stable label for the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Deep => "deep",
        }
    }
}

/// Plan state derived from the stored plan and the decision instant.
///
/// # Invariants
/// - [`PlanState::DeepExpired`] is transient and must be corrected before
///   any quota decision uses the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    /// Free tier.
    Free,
    /// Paid tier with expiry in the future.
    DeepActive,
    /// Paid tier whose expiry has passed (stale-paid).
    DeepExpired,
}

/// Channel through which a plan transition was initiated.
///
/// # Invariants
/// - Variants are stable for serialization and audit labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantChannel {
    /// Administrative grant performed by an operator.
    Admin,
    /// Self-service billing event from the payment provider.
    Billing,
}

// ============================================================================
// SECTION: Update Intents
// ============================================================================

/// Closed set of entitlement transitions.
///
/// # Invariants
/// - Each variant touches a fixed field set; see [`EntitlementRecord::apply`].
/// - Role changes are not expressible here; they are a separate
///   account-store operation unreachable from billing events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntitlementUpdate {
    /// Grant or re-grant the paid plan with an explicit expiry.
    GrantDeep {
        /// Instant the paid plan lapses.
        expires_at: Timestamp,
        /// Channel that initiated the grant.
        channel: GrantChannel,
    },
    /// Extend the paid plan from a billing renewal.
    ///
    /// State-setting rather than incrementing: re-applying the same renewal
    /// leaves the record unchanged.
    RenewDeep {
        /// Provider-supplied period end.
        expires_at: Timestamp,
    },
    /// Downgrade to the free tier (cancellation, payment failure, or an
    /// administrative downgrade).
    Downgrade {
        /// Channel that initiated the downgrade.
        channel: GrantChannel,
    },
    /// Correct a stale-paid record to the free tier.
    LazyExpire,
    /// Administrative reset of both lifetime counters to zero.
    ResetCounters,
    /// Acknowledge the one-time admin-upgrade notice.
    MarkUpgradeNoticeSeen,
}

// ============================================================================
// SECTION: Entitlement Record
// ============================================================================

/// Per-account entitlement state.
///
/// # Invariants
/// - `plan == Free` implies `plan_expires_at == None`.
/// - Lifetime counters are monotonically non-decreasing except for
///   [`EntitlementUpdate::ResetCounters`].
/// - Creation state is the free tier with zeroed counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementRecord {
    /// Owning account identifier.
    pub account_id: AccountId,
    /// Stored plan tier.
    pub plan: Plan,
    /// Expiry instant for the paid plan.
    pub plan_expires_at: Option<Timestamp>,
    /// Lifetime count of consumed single-entry analyses.
    pub lifetime_analysis_count: u32,
    /// Lifetime count of consumed weekly reports (free tier only).
    pub lifetime_weekly_report_count: u32,
    /// Whether the paid plan was first granted administratively.
    pub was_admin_upgraded: bool,
    /// Whether the one-time admin-upgrade notice has been acknowledged.
    pub has_seen_upgrade_notice: bool,
}

impl EntitlementRecord {
    /// Creates the registration-time record for a new account.
    #[must_use]
    pub const fn new_free(account_id: AccountId) -> Self {
        Self {
            account_id,
            plan: Plan::Free,
            plan_expires_at: None,
            lifetime_analysis_count: 0,
            lifetime_weekly_report_count: 0,
            was_admin_upgraded: false,
            has_seen_upgrade_notice: true,
        }
    }

    /// Derives the plan state at the given instant.
    #[must_use]
    pub fn plan_state(&self, now: Timestamp) -> PlanState {
        match (self.plan, self.plan_expires_at) {
            (Plan::Free, _) => PlanState::Free,
            (Plan::Deep, Some(expires_at)) if now.is_before(expires_at) => PlanState::DeepActive,
            // A paid plan without an expiry cannot satisfy the active check
            // and is treated as stale so the next read repairs it.
            (Plan::Deep, _) => PlanState::DeepExpired,
        }
    }

    /// Returns true when the record is stale-paid and must be corrected
    /// before a decision is made from it.
    #[must_use]
    pub fn needs_lazy_correction(&self, now: Timestamp) -> bool {
        self.plan_state(now) == PlanState::DeepExpired
    }

    /// Applies an update intent, mutating exactly the fields the intent owns.
    pub fn apply(&mut self, update: &EntitlementUpdate) {
        match update {
            EntitlementUpdate::GrantDeep { expires_at, channel } => {
                // The celebratory-notice flags fire only on the first
                // free-to-paid edge of an administrative grant.
                if *channel == GrantChannel::Admin && self.plan == Plan::Free {
                    self.was_admin_upgraded = true;
                    self.has_seen_upgrade_notice = false;
                }
                self.plan = Plan::Deep;
                self.plan_expires_at = Some(*expires_at);
            }
            EntitlementUpdate::RenewDeep { expires_at } => {
                self.plan = Plan::Deep;
                self.plan_expires_at = Some(*expires_at);
            }
            EntitlementUpdate::Downgrade { channel: _ } => {
                self.plan = Plan::Free;
                self.plan_expires_at = None;
                self.was_admin_upgraded = false;
            }
            EntitlementUpdate::LazyExpire => {
                self.plan = Plan::Free;
                self.plan_expires_at = None;
            }
            EntitlementUpdate::ResetCounters => {
                self.lifetime_analysis_count = 0;
                self.lifetime_weekly_report_count = 0;
            }
            EntitlementUpdate::MarkUpgradeNoticeSeen => {
                self.has_seen_upgrade_notice = true;
            }
        }
    }
}
