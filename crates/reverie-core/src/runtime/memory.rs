// crates/reverie-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Authority Store
// Description: Mutex-guarded store implementation for tests and examples.
// Purpose: Provide a deterministic store without external dependencies.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! [`InMemoryAuthorityStore`] keeps every record behind one mutex, which
//! makes each store operation naturally atomic and satisfies the
//! conditional-commit contracts of the interfaces without a real database.
//! Durable deployments use the `SQLite` store crate instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use time::Date;

use crate::core::account::AccountRecord;
use crate::core::claims::Role;
use crate::core::entitlement::EntitlementRecord;
use crate::core::entitlement::EntitlementUpdate;
use crate::core::identifiers::AccountId;
use crate::core::time::Timestamp;
use crate::core::time::WeekWindow;
use crate::interfaces::AccountStore;
use crate::interfaces::CommitOutcome;
use crate::interfaces::EntitlementStore;
use crate::interfaces::ReportConstraint;
use crate::interfaces::StoreError;
use crate::interfaces::UsageStore;

// ============================================================================
// SECTION: State
// ============================================================================

/// Mutable state behind the store mutex.
#[derive(Debug, Default)]
struct MemoryState {
    /// Identity records by account.
    accounts: HashMap<AccountId, AccountRecord>,
    /// Entitlement records by account.
    entitlements: HashMap<AccountId, EntitlementRecord>,
    /// Append-only report records.
    reports: Vec<(AccountId, Timestamp)>,
    /// Append-only journal entry dates.
    entries: Vec<(AccountId, Date)>,
}

/// In-memory store implementing every authority store surface.
///
/// # Invariants
/// - All operations run under one mutex; each is atomic with respect to the
///   others.
#[derive(Debug, Default)]
pub struct InMemoryAuthorityStore {
    /// Guarded store state.
    state: Mutex<MemoryState>,
}

impl InMemoryAuthorityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the state lock, mapping poisoning to a backend error.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Backend("store mutex poisoned".to_string()))
    }
}

/// Converts a window boundary failure into a backend error.
fn window_error(error: crate::core::time::TimeError) -> StoreError {
    StoreError::Backend(format!("week window out of range: {error}"))
}

// ============================================================================
// SECTION: Entitlement Store
// ============================================================================

impl EntitlementStore for InMemoryAuthorityStore {
    fn load_entitlement(
        &self,
        account: &AccountId,
    ) -> Result<Option<EntitlementRecord>, StoreError> {
        Ok(self.lock()?.entitlements.get(account).cloned())
    }

    fn create_entitlement(&self, record: &EntitlementRecord) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.entitlements.contains_key(&record.account_id) {
            return Err(StoreError::AccountExists(record.account_id.clone()));
        }
        state.entitlements.insert(record.account_id.clone(), record.clone());
        Ok(())
    }

    fn apply_entitlement_update(
        &self,
        account: &AccountId,
        update: &EntitlementUpdate,
    ) -> Result<EntitlementRecord, StoreError> {
        let mut state = self.lock()?;
        let record = state
            .entitlements
            .get_mut(account)
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        record.apply(update);
        Ok(record.clone())
    }

    fn try_consume_analysis(
        &self,
        account: &AccountId,
        limit: u32,
    ) -> Result<CommitOutcome, StoreError> {
        let mut state = self.lock()?;
        let record = state
            .entitlements
            .get_mut(account)
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        if record.lifetime_analysis_count < limit {
            record.lifetime_analysis_count += 1;
            Ok(CommitOutcome::Committed)
        } else {
            Ok(CommitOutcome::Exhausted)
        }
    }
}

// ============================================================================
// SECTION: Usage Store
// ============================================================================

impl UsageStore for InMemoryAuthorityStore {
    fn reports_in_window(
        &self,
        account: &AccountId,
        window: WeekWindow,
    ) -> Result<u32, StoreError> {
        let start = window.start_instant().map_err(window_error)?;
        let end = window.end_instant_exclusive().map_err(window_error)?;
        let state = self.lock()?;
        let count = state
            .reports
            .iter()
            .filter(|(owner, created_at)| {
                owner == account && *created_at >= start && created_at.is_before(end)
            })
            .count();
        u32::try_from(count).map_err(|_| StoreError::Backend("report count overflow".to_string()))
    }

    fn distinct_entry_days(
        &self,
        account: &AccountId,
        window: WeekWindow,
    ) -> Result<u32, StoreError> {
        let state = self.lock()?;
        let mut days: HashSet<Date> = HashSet::new();
        for (owner, date) in &state.entries {
            if owner == account && window.contains_date(*date).map_err(window_error)? {
                days.insert(*date);
            }
        }
        u32::try_from(days.len())
            .map_err(|_| StoreError::Backend("entry day count overflow".to_string()))
    }

    fn insert_report_if_within(
        &self,
        account: &AccountId,
        created_at: Timestamp,
        constraint: ReportConstraint,
    ) -> Result<CommitOutcome, StoreError> {
        let mut state = self.lock()?;
        match constraint {
            ReportConstraint::Unbounded => {}
            ReportConstraint::WindowCapped { window, cap } => {
                let start = window.start_instant().map_err(window_error)?;
                let end = window.end_instant_exclusive().map_err(window_error)?;
                let used = state
                    .reports
                    .iter()
                    .filter(|(owner, at)| owner == account && *at >= start && at.is_before(end))
                    .count();
                if used >= usize::try_from(cap).unwrap_or(usize::MAX) {
                    return Ok(CommitOutcome::Exhausted);
                }
            }
            ReportConstraint::LifetimeCapped { cap } => {
                let record = state
                    .entitlements
                    .get_mut(account)
                    .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
                if record.lifetime_weekly_report_count >= cap {
                    return Ok(CommitOutcome::Exhausted);
                }
                record.lifetime_weekly_report_count += 1;
            }
        }
        state.reports.push((account.clone(), created_at));
        Ok(CommitOutcome::Committed)
    }

    fn record_entry_day(&self, account: &AccountId, entry_date: Date) -> Result<(), StoreError> {
        self.lock()?.entries.push((account.clone(), entry_date));
        Ok(())
    }
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

impl AccountStore for InMemoryAuthorityStore {
    fn load_account(&self, account: &AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.lock()?.accounts.get(account).cloned())
    }

    fn create_account(&self, record: &AccountRecord) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.accounts.contains_key(&record.account_id) {
            return Err(StoreError::AccountExists(record.account_id.clone()));
        }
        state.accounts.insert(record.account_id.clone(), record.clone());
        Ok(())
    }

    fn set_role(&self, account: &AccountId, role: Role) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state
            .accounts
            .get_mut(account)
            .ok_or_else(|| StoreError::AccountNotFound(account.clone()))?;
        record.role = role;
        Ok(())
    }

    fn delete_account(&self, account: &AccountId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.accounts.remove(account).is_none() {
            return Err(StoreError::AccountNotFound(account.clone()));
        }
        state.entitlements.remove(account);
        state.reports.retain(|(owner, _)| owner != account);
        state.entries.retain(|(owner, _)| owner != account);
        Ok(())
    }
}
