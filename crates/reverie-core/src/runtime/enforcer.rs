// crates/reverie-core/src/runtime/enforcer.rs
// ============================================================================
// Module: Quota Enforcer
// Description: Authorization decisions and at-most-once quota commits.
// Purpose: Gate metered actions on role, plan state, and usage counters.
// Dependencies: crate::{core, interfaces, telemetry}
// ============================================================================

//! ## Overview
//! A single authorization decision proceeds: lazy expiry correction, role
//! check, plan check, counter/day check. The correction is persisted before
//! any counter is read so a stale paid plan can never influence the outcome.
//!
//! Consumption is split from authorization: `authorize` reads, the commit
//! methods write. Commits run through the store's conditional operations, so
//! two racing requests with one quota unit remaining produce exactly one
//! committed result; the loser surfaces as quota exhaustion and its output
//! must not be delivered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use time::UtcOffset;

use crate::core::claims::IdentityClaim;
use crate::core::entitlement::EntitlementRecord;
use crate::core::entitlement::EntitlementUpdate;
use crate::core::entitlement::PlanState;
use crate::core::identifiers::AccountId;
use crate::core::quota::ActionKind;
use crate::core::quota::DenyReason;
use crate::core::quota::QuotaDecision;
use crate::core::quota::QuotaLimits;
use crate::core::time::Timestamp;
use crate::core::time::WeekWindow;
use crate::errors::AuthorityError;
use crate::interfaces::AuthorityStore;
use crate::interfaces::CommitOutcome;
use crate::interfaces::ReportConstraint;
use crate::telemetry::AuthorityTelemetry;
use crate::telemetry::DecisionEvent;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Remedy hint for an exhausted free analysis quota.
const MSG_ANALYSIS_LIMIT: &str =
    "Free analysis limit reached. Upgrade to Deep to keep analyzing your dreams.";
/// Remedy hint for an exhausted free lifetime report quota.
const MSG_REPORT_LIMIT_FREE: &str =
    "Free report limit reached. Upgrade to Deep for weekly reports.";
/// Remedy hint for an exhausted paid weekly report quota.
const MSG_REPORT_LIMIT_DEEP: &str =
    "Weekly report limit reached. A new week starts on Sunday.";

/// Builds the remedy hint for an unmet distinct-day requirement.
fn insufficient_days_message(required: u32, recorded: u32) -> String {
    format!(
        "Record dreams on at least {required} distinct days this week to generate a report \
         ({recorded} so far)."
    )
}

// ============================================================================
// SECTION: Enforcer
// ============================================================================

/// Quota enforcer for metered actions.
///
/// # Invariants
/// - Every decision operates on a lazily corrected entitlement record.
/// - Commit methods are called only after the metered work succeeded, and
///   only when the allow decision carried `consumes_quota` (reports also
///   commit for premium callers to persist the window-counted record).
pub struct QuotaEnforcer {
    /// Record store shared with the rest of the authority.
    store: Arc<dyn AuthorityStore>,
    /// Telemetry sink for decision events.
    telemetry: Arc<dyn AuthorityTelemetry>,
    /// Configured quota limits.
    limits: QuotaLimits,
    /// Fixed server-local offset for week windows.
    week_offset: UtcOffset,
}

impl QuotaEnforcer {
    /// Creates an enforcer over the given store and telemetry sink.
    #[must_use]
    pub fn new(
        store: Arc<dyn AuthorityStore>,
        telemetry: Arc<dyn AuthorityTelemetry>,
        limits: QuotaLimits,
        week_offset: UtcOffset,
    ) -> Self {
        Self { store, telemetry, limits, week_offset }
    }

    /// Loads the entitlement record, applying and persisting the lazy
    /// stale-paid correction first when needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Store`] when no record exists or the
    /// backend fails.
    pub fn load_corrected(
        &self,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<EntitlementRecord, AuthorityError> {
        let record = self
            .store
            .load_entitlement(account)?
            .ok_or_else(|| crate::interfaces::StoreError::AccountNotFound(account.clone()))?;
        if record.needs_lazy_correction(now) {
            let corrected =
                self.store.apply_entitlement_update(account, &EntitlementUpdate::LazyExpire)?;
            self.telemetry.record_lazy_correction(account);
            return Ok(corrected);
        }
        Ok(record)
    }

    /// Decides whether the identity may perform the metered action.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError`] on store failure or an unrepresentable
    /// decision instant; allow/deny outcomes are values, not errors.
    pub fn authorize(
        &self,
        claim: &IdentityClaim,
        action: ActionKind,
        now: Timestamp,
    ) -> Result<QuotaDecision, AuthorityError> {
        let record = self.load_corrected(&claim.account_id, now)?;
        let decision = if claim.is_superadmin() {
            QuotaDecision::Allowed { consumes_quota: false }
        } else {
            match action {
                ActionKind::SingleAnalysis => self.decide_analysis(&record, now),
                ActionKind::WeeklyReport => self.decide_report(&record, now)?,
            }
        };
        self.telemetry.record_decision(decision_event(&claim.account_id, action, &decision));
        Ok(decision)
    }

    /// Decides a single-analysis request for a non-superadmin identity.
    fn decide_analysis(&self, record: &EntitlementRecord, now: Timestamp) -> QuotaDecision {
        if record.plan_state(now) == PlanState::DeepActive {
            return QuotaDecision::Allowed { consumes_quota: false };
        }
        if record.lifetime_analysis_count < self.limits.free_analysis_limit {
            QuotaDecision::Allowed { consumes_quota: true }
        } else {
            QuotaDecision::Denied {
                reason: DenyReason::QuotaExceeded,
                message: MSG_ANALYSIS_LIMIT.to_string(),
            }
        }
    }

    /// Decides a weekly-report request for a non-superadmin identity.
    ///
    /// Quota is checked before the day-count precondition so an exhausted
    /// caller always sees the quota remedy.
    fn decide_report(
        &self,
        record: &EntitlementRecord,
        now: Timestamp,
    ) -> Result<QuotaDecision, AuthorityError> {
        let window = WeekWindow::containing(now, self.week_offset)?;
        if record.plan_state(now) == PlanState::DeepActive {
            let used = self.store.reports_in_window(&record.account_id, window)?;
            if used >= self.limits.deep_reports_per_week {
                return Ok(QuotaDecision::Denied {
                    reason: DenyReason::QuotaExceeded,
                    message: MSG_REPORT_LIMIT_DEEP.to_string(),
                });
            }
            let recorded = self.store.distinct_entry_days(&record.account_id, window)?;
            if recorded < self.limits.deep_min_distinct_days {
                return Ok(QuotaDecision::Denied {
                    reason: DenyReason::InsufficientDays,
                    message: insufficient_days_message(
                        self.limits.deep_min_distinct_days,
                        recorded,
                    ),
                });
            }
            return Ok(QuotaDecision::Allowed { consumes_quota: false });
        }
        if record.lifetime_weekly_report_count >= self.limits.free_report_lifetime_limit {
            return Ok(QuotaDecision::Denied {
                reason: DenyReason::QuotaExceeded,
                message: MSG_REPORT_LIMIT_FREE.to_string(),
            });
        }
        let recorded = self.store.distinct_entry_days(&record.account_id, window)?;
        if recorded < self.limits.free_min_distinct_days {
            return Ok(QuotaDecision::Denied {
                reason: DenyReason::InsufficientDays,
                message: insufficient_days_message(self.limits.free_min_distinct_days, recorded),
            });
        }
        Ok(QuotaDecision::Allowed { consumes_quota: true })
    }

    /// Consumes one analysis quota unit after the metered work succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::QuotaExceeded`] when a racing request
    /// consumed the last unit first (the caller must not deliver its
    /// result), and [`AuthorityError::Store`] on backend failure.
    pub fn commit_analysis(&self, account: &AccountId) -> Result<(), AuthorityError> {
        match self.store.try_consume_analysis(account, self.limits.free_analysis_limit)? {
            CommitOutcome::Committed => Ok(()),
            CommitOutcome::Exhausted => {
                Err(AuthorityError::QuotaExceeded(MSG_ANALYSIS_LIMIT.to_string()))
            }
        }
    }

    /// Persists a produced report after the metered work succeeded,
    /// consuming lifetime quota for free-tier callers.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::QuotaExceeded`] when a racing request
    /// exhausted the applicable cap first, and [`AuthorityError::Store`] on
    /// backend failure.
    pub fn commit_report(
        &self,
        claim: &IdentityClaim,
        now: Timestamp,
    ) -> Result<(), AuthorityError> {
        let (constraint, exhausted_message) = if claim.is_superadmin() {
            (ReportConstraint::Unbounded, MSG_REPORT_LIMIT_DEEP)
        } else {
            let record = self.load_corrected(&claim.account_id, now)?;
            if record.plan_state(now) == PlanState::DeepActive {
                let window = WeekWindow::containing(now, self.week_offset)?;
                (
                    ReportConstraint::WindowCapped {
                        window,
                        cap: self.limits.deep_reports_per_week,
                    },
                    MSG_REPORT_LIMIT_DEEP,
                )
            } else {
                (
                    ReportConstraint::LifetimeCapped {
                        cap: self.limits.free_report_lifetime_limit,
                    },
                    MSG_REPORT_LIMIT_FREE,
                )
            }
        };
        match self.store.insert_report_if_within(&claim.account_id, now, constraint)? {
            CommitOutcome::Committed => Ok(()),
            CommitOutcome::Exhausted => {
                Err(AuthorityError::QuotaExceeded(exhausted_message.to_string()))
            }
        }
    }

    /// Returns true when the identity bypasses lifetime and weekly counters.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Store`] when the record cannot be loaded.
    pub fn is_premium(
        &self,
        claim: &IdentityClaim,
        now: Timestamp,
    ) -> Result<bool, AuthorityError> {
        if claim.is_superadmin() {
            return Ok(true);
        }
        let record = self.load_corrected(&claim.account_id, now)?;
        Ok(record.plan_state(now) == PlanState::DeepActive)
    }
}

/// Builds the telemetry event for a decision.
fn decision_event(
    account: &AccountId,
    action: ActionKind,
    decision: &QuotaDecision,
) -> DecisionEvent {
    match decision {
        QuotaDecision::Allowed { consumes_quota } => DecisionEvent {
            account_id: account.clone(),
            action,
            allowed: true,
            consumes_quota: *consumes_quota,
            deny_reason: None,
        },
        QuotaDecision::Denied { reason, message: _ } => DecisionEvent {
            account_id: account.clone(),
            action,
            allowed: false,
            consumes_quota: false,
            deny_reason: Some(*reason),
        },
    }
}
