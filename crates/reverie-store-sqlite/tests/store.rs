// crates/reverie-store-sqlite/tests/store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate durable store behavior and conditional commits.
// Purpose: Ensure quota guards, cascades, and corruption checks hold.
// Dependencies: reverie-store-sqlite, reverie-core, tempfile, time
// ============================================================================

//! Durable store behavior tests, on-disk and in-memory.

use reverie_core::AccountId;
use reverie_core::AccountRecord;
use reverie_core::AccountStore;
use reverie_core::CommitOutcome;
use reverie_core::EntitlementRecord;
use reverie_core::EntitlementStore;
use reverie_core::EntitlementUpdate;
use reverie_core::GrantChannel;
use reverie_core::Plan;
use reverie_core::ReportConstraint;
use reverie_core::Role;
use reverie_core::StoreError;
use reverie_core::Timestamp;
use reverie_core::UsageStore;
use reverie_core::WeekWindow;
use reverie_store_sqlite::SqliteAuthorityStore;
use reverie_store_sqlite::SqliteStoreConfig;
use time::UtcOffset;
use time::macros::date;
use time::macros::datetime;

/// Test result alias keeping assertions terse.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Reference instant: Thursday 2026-08-06 noon UTC.
fn now() -> Timestamp {
    Timestamp::from_unix_millis(datetime!(2026-08-06 12:00 UTC).unix_timestamp() * 1_000)
}

/// Seeds an account plus its registration-time entitlement.
fn seed_account(
    store: &SqliteAuthorityStore,
    id: &str,
) -> Result<AccountId, Box<dyn std::error::Error>> {
    let account_id = AccountId::new(id);
    store.create_account(&AccountRecord {
        account_id: account_id.clone(),
        email: format!("{id}@example.com"),
        display_name: Some("Dreamer".to_string()),
        role: Role::Standard,
    })?;
    store.create_entitlement(&EntitlementRecord::new_free(account_id.clone()))?;
    Ok(account_id)
}

#[test]
fn records_round_trip_through_disk() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = SqliteStoreConfig::new(dir.path().join("authority.db"));
    let account_id = {
        let store = SqliteAuthorityStore::open(&config)?;
        let account_id = seed_account(&store, "acct-disk")?;
        store.apply_entitlement_update(
            &account_id,
            &EntitlementUpdate::GrantDeep {
                expires_at: now().plus_days(30),
                channel: GrantChannel::Admin,
            },
        )?;
        account_id
    };

    // Reopen: state must be durable, not connection-local.
    let store = SqliteAuthorityStore::open(&config)?;
    let record = store.load_entitlement(&account_id)?.ok_or("entitlement missing")?;
    assert_eq!(record.plan, Plan::Deep);
    assert!(record.was_admin_upgraded);
    assert!(!record.has_seen_upgrade_notice);
    let account = store.load_account(&account_id)?.ok_or("account missing")?;
    assert_eq!(account.email, "acct-disk@example.com");
    Ok(())
}

#[test]
fn conditional_analysis_increment_stops_exactly_at_the_limit() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;

    for _ in 0..3 {
        assert_eq!(store.try_consume_analysis(&account, 3)?, CommitOutcome::Committed);
    }
    assert_eq!(store.try_consume_analysis(&account, 3)?, CommitOutcome::Exhausted);
    let record = store.load_entitlement(&account)?.ok_or("entitlement missing")?;
    assert_eq!(record.lifetime_analysis_count, 3);
    Ok(())
}

#[test]
fn consuming_for_a_missing_account_is_an_error() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    match store.try_consume_analysis(&AccountId::new("acct-ghost"), 3) {
        Err(StoreError::AccountNotFound(_)) => Ok(()),
        other => Err(format!("expected missing account, got {other:?}").into()),
    }
}

#[test]
fn window_capped_report_inserts_stop_at_the_cap() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    let window = WeekWindow::containing(now(), UtcOffset::UTC)?;
    let constraint = ReportConstraint::WindowCapped { window, cap: 2 };

    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Committed);
    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Committed);
    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Exhausted);
    assert_eq!(store.reports_in_window(&account, window)?, 2);

    // Reports in another window never count against this one.
    let next_week = now().plus_days(7);
    let next_window = WeekWindow::containing(next_week, UtcOffset::UTC)?;
    let next_constraint = ReportConstraint::WindowCapped { window: next_window, cap: 2 };
    assert_eq!(
        store.insert_report_if_within(&account, next_week, next_constraint)?,
        CommitOutcome::Committed
    );
    assert_eq!(store.reports_in_window(&account, window)?, 2);
    Ok(())
}

#[test]
fn lifetime_capped_report_inserts_increment_the_counter() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    let constraint = ReportConstraint::LifetimeCapped { cap: 2 };

    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Committed);
    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Committed);
    assert_eq!(store.insert_report_if_within(&account, now(), constraint)?, CommitOutcome::Exhausted);

    let record = store.load_entitlement(&account)?.ok_or("entitlement missing")?;
    assert_eq!(record.lifetime_weekly_report_count, 2);
    // The exhausted attempt wrote neither the counter nor a report row.
    let window = WeekWindow::containing(now(), UtcOffset::UTC)?;
    assert_eq!(store.reports_in_window(&account, window)?, 2);
    Ok(())
}

#[test]
fn distinct_day_counting_ignores_duplicates_and_other_windows() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    for day in [
        date!(2026 - 08 - 02),
        date!(2026 - 08 - 02),
        date!(2026 - 08 - 04),
        date!(2026 - 08 - 08),
        date!(2026 - 07 - 31),
        date!(2026 - 08 - 09),
    ] {
        store.record_entry_day(&account, day)?;
    }

    let window = WeekWindow::containing(now(), UtcOffset::UTC)?;
    assert_eq!(store.distinct_entry_days(&account, window)?, 3);
    Ok(())
}

#[test]
fn entry_days_are_scoped_per_account() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    let other = seed_account(&store, "acct-2")?;
    store.record_entry_day(&other, date!(2026 - 08 - 04))?;

    let window = WeekWindow::containing(now(), UtcOffset::UTC)?;
    assert_eq!(store.distinct_entry_days(&account, window)?, 0);
    Ok(())
}

#[test]
fn account_deletion_cascades_to_every_collection() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    store.record_entry_day(&account, date!(2026 - 08 - 04))?;
    store.insert_report_if_within(&account, now(), ReportConstraint::Unbounded)?;

    store.delete_account(&account)?;
    assert!(store.load_account(&account)?.is_none());
    assert!(store.load_entitlement(&account)?.is_none());
    let window = WeekWindow::containing(now(), UtcOffset::UTC)?;
    assert_eq!(store.reports_in_window(&account, window)?, 0);
    assert_eq!(store.distinct_entry_days(&account, window)?, 0);
    Ok(())
}

#[test]
fn duplicate_creation_is_rejected() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    let duplicate = AccountRecord {
        account_id: account.clone(),
        email: "other@example.com".to_string(),
        display_name: None,
        role: Role::Standard,
    };
    match store.create_account(&duplicate) {
        Err(StoreError::AccountExists(_)) => {}
        other => return Err(format!("expected duplicate rejection, got {other:?}").into()),
    }
    match store.create_entitlement(&EntitlementRecord::new_free(account)) {
        Err(StoreError::AccountExists(_)) => Ok(()),
        other => Err(format!("expected duplicate rejection, got {other:?}").into()),
    }
}

#[test]
fn role_updates_persist() -> TestResult {
    let store = SqliteAuthorityStore::open_in_memory()?;
    let account = seed_account(&store, "acct-1")?;
    store.set_role(&account, Role::Superadmin)?;
    let record = store.load_account(&account)?.ok_or("account missing")?;
    assert_eq!(record.role, Role::Superadmin);
    Ok(())
}
