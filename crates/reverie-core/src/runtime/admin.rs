// crates/reverie-core/src/runtime/admin.rs
// ============================================================================
// Module: Administrative Operations
// Description: Role, plan, and counter operations with authorization guards.
// Purpose: Apply operator-initiated transitions with self-escalation checks.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! Administrative operations require the superadmin role, and the role/plan
//! operations additionally reject an account acting on itself. Both checks
//! run before any store mutation is attempted, so a rejected request leaves
//! no partial state.
//!
//! Registration is also hosted here: the account record and its free-tier
//! entitlement record are created together.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use time::UtcOffset;

use crate::core::account::AccountRecord;
use crate::core::claims::IdentityClaim;
use crate::core::claims::Role;
use crate::core::entitlement::EntitlementRecord;
use crate::core::entitlement::EntitlementUpdate;
use crate::core::entitlement::GrantChannel;
use crate::core::identifiers::AccountId;
use crate::core::time::Timestamp;
use crate::core::time::add_calendar_months;
use crate::errors::AuthorityError;
use crate::interfaces::AuthorityStore;

// ============================================================================
// SECTION: Grant Expiry
// ============================================================================

/// Expiry selection for an administrative plan grant.
///
/// # Invariants
/// - Month-based variants are computed from the grant instant with calendar
///   month addition (end-of-month clamping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantExpiry {
    /// One calendar month from the grant instant.
    OneMonth,
    /// Twelve calendar months from the grant instant.
    TwelveMonths,
    /// Explicit administrator-chosen instant.
    At(Timestamp),
}

// ============================================================================
// SECTION: Admin Service
// ============================================================================

/// Operator-facing service for account and entitlement administration.
///
/// # Invariants
/// - Every operation checks authorization before touching the store.
/// - Role transitions are unreachable from billing events by construction;
///   only this service exposes them.
pub struct AdminService {
    /// Record store shared with the rest of the authority.
    store: Arc<dyn AuthorityStore>,
    /// Fixed server-local offset for calendar expiry computation.
    week_offset: UtcOffset,
}

impl AdminService {
    /// Creates an admin service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn AuthorityStore>, week_offset: UtcOffset) -> Self {
        Self { store, week_offset }
    }

    /// Registers a new account: identity record plus free-tier entitlement.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Store`] when the account already exists or
    /// the backend fails.
    pub fn register_account(
        &self,
        record: &AccountRecord,
    ) -> Result<EntitlementRecord, AuthorityError> {
        self.store.create_account(record)?;
        let entitlement = EntitlementRecord::new_free(record.account_id.clone());
        self.store.create_entitlement(&entitlement)?;
        Ok(entitlement)
    }

    /// Grants the paid plan to the target account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Forbidden`] when the actor is not a
    /// superadmin or targets itself, and [`AuthorityError`] on store or
    /// calendar failure.
    pub fn grant_deep(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
        expiry: GrantExpiry,
        now: Timestamp,
    ) -> Result<EntitlementRecord, AuthorityError> {
        self.require_superadmin(actor)?;
        self.reject_self_target(actor, target)?;
        let expires_at = match expiry {
            GrantExpiry::OneMonth => add_calendar_months(now, 1, self.week_offset)?,
            GrantExpiry::TwelveMonths => add_calendar_months(now, 12, self.week_offset)?,
            GrantExpiry::At(instant) => instant,
        };
        let update = EntitlementUpdate::GrantDeep { expires_at, channel: GrantChannel::Admin };
        Ok(self.store.apply_entitlement_update(target, &update)?)
    }

    /// Downgrades the target account to the free tier.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Forbidden`] when the actor is not a
    /// superadmin or targets itself, and [`AuthorityError::Store`] on
    /// backend failure.
    pub fn downgrade(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
    ) -> Result<EntitlementRecord, AuthorityError> {
        self.require_superadmin(actor)?;
        self.reject_self_target(actor, target)?;
        let update = EntitlementUpdate::Downgrade { channel: GrantChannel::Admin };
        Ok(self.store.apply_entitlement_update(target, &update)?)
    }

    /// Resets both lifetime counters of the target account to zero.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Forbidden`] when the actor is not a
    /// superadmin, and [`AuthorityError::Store`] on backend failure.
    pub fn reset_counters(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
    ) -> Result<EntitlementRecord, AuthorityError> {
        self.require_superadmin(actor)?;
        Ok(self.store.apply_entitlement_update(target, &EntitlementUpdate::ResetCounters)?)
    }

    /// Sets the durable role of the target account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Forbidden`] when the actor is not a
    /// superadmin or targets itself, and [`AuthorityError::Store`] on
    /// backend failure.
    pub fn set_role(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
        role: Role,
    ) -> Result<(), AuthorityError> {
        self.require_superadmin(actor)?;
        self.reject_self_target(actor, target)?;
        self.store.set_role(target, role)?;
        Ok(())
    }

    /// Acknowledges the one-time upgrade notice for the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Store`] on backend failure.
    pub fn mark_notice_seen(
        &self,
        claim: &IdentityClaim,
    ) -> Result<EntitlementRecord, AuthorityError> {
        let update = EntitlementUpdate::MarkUpgradeNoticeSeen;
        Ok(self.store.apply_entitlement_update(&claim.account_id, &update)?)
    }

    /// Deletes an account and all of its records.
    ///
    /// Allowed for the account holder and for superadmins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Forbidden`] when the actor is neither, and
    /// [`AuthorityError::Store`] on backend failure.
    pub fn delete_account(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
    ) -> Result<(), AuthorityError> {
        if !actor.is_superadmin() && actor.account_id != *target {
            return Err(AuthorityError::Forbidden(
                "only the account holder or an operator may delete an account".to_string(),
            ));
        }
        self.store.delete_account(target)?;
        Ok(())
    }

    /// Rejects actors without the superadmin role.
    fn require_superadmin(&self, actor: &IdentityClaim) -> Result<(), AuthorityError> {
        if actor.is_superadmin() {
            Ok(())
        } else {
            Err(AuthorityError::Forbidden("operator role required".to_string()))
        }
    }

    /// Rejects role/plan operations an account attempts on itself.
    fn reject_self_target(
        &self,
        actor: &IdentityClaim,
        target: &AccountId,
    ) -> Result<(), AuthorityError> {
        if actor.account_id == *target {
            Err(AuthorityError::Forbidden(
                "accounts cannot modify their own role or plan".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
