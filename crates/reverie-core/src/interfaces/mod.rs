// crates/reverie-core/src/interfaces/mod.rs
// ============================================================================
// Module: Reverie Interfaces
// Description: Backend-agnostic interfaces for the record store and clock.
// Purpose: Define the contract surfaces used by the authority runtime.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the authority integrates with the persistent record
//! store without embedding backend-specific details. Implementations must be
//! deterministic and fail closed on missing or invalid data.
//!
//! The quota-consuming operations ([`EntitlementStore::try_consume_analysis`]
//! and [`UsageStore::insert_report_if_within`]) are the serialization points
//! for same-account races: each must check its guard and perform its write as
//! one atomic step so concurrent requests can never consume past a limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::core::account::AccountRecord;
use crate::core::claims::Role;
use crate::core::entitlement::EntitlementRecord;
use crate::core::entitlement::EntitlementUpdate;
use crate::core::identifiers::AccountId;
use crate::core::time::Timestamp;
use crate::core::time::WeekWindow;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Record store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Backend messages must not leak credentials or secrets.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the account.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),
    /// A record already exists for the account.
    #[error("account already exists: {0}")]
    AccountExists(AccountId),
    /// Stored data failed validation on load.
    #[error("corrupt record for account {account}: {detail}")]
    Corrupt {
        /// Account whose record failed validation.
        account: AccountId,
        /// Human-readable corruption detail.
        detail: String,
    },
    /// Backend failure (connection, statement, transaction).
    #[error("store backend error: {0}")]
    Backend(String),
}

// ============================================================================
// SECTION: Commit Outcomes
// ============================================================================

/// Outcome of an atomic quota-consuming store operation.
///
/// # Invariants
/// - `Committed` means the guard passed and the write is durable.
/// - `Exhausted` means the guard failed and nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The guarded write was applied.
    Committed,
    /// The guard failed; no state changed.
    Exhausted,
}

/// Guard applied when persisting a weekly report.
///
/// # Invariants
/// - The guard is evaluated inside the same atomic step as the insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportConstraint {
    /// No guard (superadmin callers).
    Unbounded,
    /// At most this many reports inside the given week window (paid tier).
    WindowCapped {
        /// Window the cap applies to.
        window: WeekWindow,
        /// Maximum reports within the window.
        cap: u32,
    },
    /// Lifetime counter guard with increment (free tier).
    LifetimeCapped {
        /// Maximum lifetime reports.
        cap: u32,
    },
}

// ============================================================================
// SECTION: Entitlement Store
// ============================================================================

/// Persistence surface for entitlement records.
pub trait EntitlementStore: Send + Sync {
    /// Loads the entitlement record for an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure or corrupt data.
    fn load_entitlement(&self, account: &AccountId) -> Result<Option<EntitlementRecord>, StoreError>;

    /// Creates the registration-time entitlement record for an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountExists`] when a record already exists,
    /// and [`StoreError`] on backend failure.
    fn create_entitlement(&self, record: &EntitlementRecord) -> Result<(), StoreError>;

    /// Applies an update intent to the stored record and persists the result.
    ///
    /// The read-apply-write sequence must be atomic per account so a lazy
    /// expiry correction is visible to the quota read that follows it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] when no record exists, and
    /// [`StoreError`] on backend failure.
    fn apply_entitlement_update(
        &self,
        account: &AccountId,
        update: &EntitlementUpdate,
    ) -> Result<EntitlementRecord, StoreError>;

    /// Consumes one unit of the lifetime analysis quota when the counter is
    /// still below `limit`.
    ///
    /// Check and increment execute as one atomic step; two racing calls with
    /// one unit remaining produce exactly one [`CommitOutcome::Committed`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] when no record exists, and
    /// [`StoreError`] on backend failure.
    fn try_consume_analysis(
        &self,
        account: &AccountId,
        limit: u32,
    ) -> Result<CommitOutcome, StoreError>;
}

// ============================================================================
// SECTION: Usage Store
// ============================================================================

/// Persistence surface for report records and journal day queries.
pub trait UsageStore: Send + Sync {
    /// Counts report records created inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn reports_in_window(&self, account: &AccountId, window: WeekWindow)
    -> Result<u32, StoreError>;

    /// Counts distinct journal entry dates inside the window.
    ///
    /// Entries are counted by distinct date value, not by entry count, and
    /// only dates within the window contribute.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn distinct_entry_days(
        &self,
        account: &AccountId,
        window: WeekWindow,
    ) -> Result<u32, StoreError>;

    /// Persists a report record when the constraint guard passes.
    ///
    /// Guard evaluation and insert execute as one atomic step; the free-tier
    /// guard also increments the lifetime report counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] when no record exists, and
    /// [`StoreError`] on backend failure.
    fn insert_report_if_within(
        &self,
        account: &AccountId,
        created_at: Timestamp,
        constraint: ReportConstraint,
    ) -> Result<CommitOutcome, StoreError>;

    /// Appends a journal entry date for an account.
    ///
    /// The entry date is the user-chosen date of the journal content,
    /// independent of the creation instant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure.
    fn record_entry_day(&self, account: &AccountId, entry_date: Date) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

/// Persistence surface for identity-side account records.
pub trait AccountStore: Send + Sync {
    /// Loads an account record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on backend failure or corrupt data.
    fn load_account(&self, account: &AccountId) -> Result<Option<AccountRecord>, StoreError>;

    /// Creates an account record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountExists`] when the account already exists,
    /// and [`StoreError`] on backend failure.
    fn create_account(&self, record: &AccountRecord) -> Result<(), StoreError>;

    /// Sets the durable role for an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] when no record exists, and
    /// [`StoreError`] on backend failure.
    fn set_role(&self, account: &AccountId, role: Role) -> Result<(), StoreError>;

    /// Deletes an account and cascades to its entitlement, report, and
    /// journal records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] when no record exists, and
    /// [`StoreError`] on backend failure.
    fn delete_account(&self, account: &AccountId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Combined Store
// ============================================================================

/// Combined store surface required by the authority runtime.
pub trait AuthorityStore: EntitlementStore + UsageStore + AccountStore {}

impl<S> AuthorityStore for S where S: EntitlementStore + UsageStore + AccountStore {}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock seam supplied by hosts.
///
/// The core never reads time directly; every decision takes an explicit
/// instant produced at the edge through this trait.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}
