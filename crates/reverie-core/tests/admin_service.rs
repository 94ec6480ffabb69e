// crates/reverie-core/tests/admin_service.rs
// ============================================================================
// Module: Admin Service Tests
// Description: Validate administrative guards and transitions.
// Purpose: Ensure self-escalation is rejected before any store mutation.
// Dependencies: reverie-core, time
// ============================================================================

//! Administrative operation tests against the in-memory store.

use std::sync::Arc;

use reverie_core::AccountId;
use reverie_core::AccountRecord;
use reverie_core::AccountStore;
use reverie_core::AdminService;
use reverie_core::AuthorityError;
use reverie_core::AuthorityStore;
use reverie_core::EntitlementStore;
use reverie_core::GrantExpiry;
use reverie_core::IdentityClaim;
use reverie_core::InMemoryAuthorityStore;
use reverie_core::Plan;
use reverie_core::Role;
use reverie_core::Timestamp;
use reverie_core::UsageStore;
use time::UtcOffset;
use time::macros::date;
use time::macros::datetime;

/// Test result alias keeping assertions terse.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Grant instant: 2026-01-31 noon UTC (exercises month-end clamping).
fn now() -> Timestamp {
    Timestamp::from_unix_millis(datetime!(2026-01-31 12:00 UTC).unix_timestamp() * 1_000)
}

/// Builds an admin service over a shared in-memory store.
fn service() -> (Arc<InMemoryAuthorityStore>, AdminService) {
    let store = Arc::new(InMemoryAuthorityStore::new());
    let shared: Arc<dyn AuthorityStore> = store.clone();
    (store, AdminService::new(shared, UtcOffset::UTC))
}

/// Registers an account through the service and returns its claim.
fn register(
    admin: &AdminService,
    id: &str,
    role: Role,
) -> Result<IdentityClaim, Box<dyn std::error::Error>> {
    let record = AccountRecord {
        account_id: AccountId::new(id),
        email: format!("{id}@example.com"),
        display_name: Some(id.to_string()),
        role,
    };
    admin.register_account(&record)?;
    Ok(record.to_claim())
}

#[test]
fn registration_creates_both_records_and_rejects_duplicates() -> TestResult {
    let (store, admin) = service();
    let claim = register(&admin, "acct-new", Role::Standard)?;

    assert!(store.load_account(&claim.account_id)?.is_some());
    let entitlement =
        store.load_entitlement(&claim.account_id)?.ok_or("entitlement record missing")?;
    assert_eq!(entitlement.plan, Plan::Free);

    let duplicate = AccountRecord {
        account_id: claim.account_id.clone(),
        email: "other@example.com".to_string(),
        display_name: None,
        role: Role::Standard,
    };
    match admin.register_account(&duplicate) {
        Err(AuthorityError::Store(_)) => Ok(()),
        other => Err(format!("expected duplicate rejection, got {other:?}").into()),
    }
}

#[test]
fn self_role_change_is_forbidden_without_mutation() -> TestResult {
    let (store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;

    match admin.set_role(&operator, &operator.account_id, Role::Standard) {
        Err(AuthorityError::Forbidden(_)) => {}
        other => return Err(format!("expected forbidden, got {other:?}").into()),
    }
    let stored = store.load_account(&operator.account_id)?.ok_or("account missing")?;
    assert_eq!(stored.role, Role::Superadmin);
    Ok(())
}

#[test]
fn self_plan_grant_is_forbidden_without_mutation() -> TestResult {
    let (store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;

    match admin.grant_deep(&operator, &operator.account_id, GrantExpiry::OneMonth, now()) {
        Err(AuthorityError::Forbidden(_)) => {}
        other => return Err(format!("expected forbidden, got {other:?}").into()),
    }
    let stored =
        store.load_entitlement(&operator.account_id)?.ok_or("entitlement record missing")?;
    assert_eq!(stored.plan, Plan::Free);
    Ok(())
}

#[test]
fn standard_actor_cannot_administer() -> TestResult {
    let (_store, admin) = service();
    let actor = register(&admin, "acct-standard", Role::Standard)?;
    let target = register(&admin, "acct-target", Role::Standard)?;

    match admin.grant_deep(&actor, &target.account_id, GrantExpiry::OneMonth, now()) {
        Err(AuthorityError::Forbidden(_)) => {}
        other => return Err(format!("expected forbidden, got {other:?}").into()),
    }
    match admin.set_role(&actor, &target.account_id, Role::Superadmin) {
        Err(AuthorityError::Forbidden(_)) => Ok(()),
        other => Err(format!("expected forbidden, got {other:?}").into()),
    }
}

#[test]
fn one_month_grant_clamps_to_month_end() -> TestResult {
    let (_store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;
    let target = register(&admin, "acct-target", Role::Standard)?;

    let record = admin.grant_deep(&operator, &target.account_id, GrantExpiry::OneMonth, now())?;
    let expires_at = record.plan_expires_at.ok_or("expiry missing")?;
    // 2026-01-31 plus one calendar month clamps to 2026-02-28.
    let expected = datetime!(2026-02-28 12:00 UTC).unix_timestamp() * 1_000;
    assert_eq!(expires_at.as_unix_millis(), expected);
    assert!(record.was_admin_upgraded);
    assert!(!record.has_seen_upgrade_notice);
    Ok(())
}

#[test]
fn explicit_expiry_grant_is_used_verbatim() -> TestResult {
    let (_store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;
    let target = register(&admin, "acct-target", Role::Standard)?;

    let chosen = now().plus_days(10);
    let record =
        admin.grant_deep(&operator, &target.account_id, GrantExpiry::At(chosen), now())?;
    assert_eq!(record.plan_expires_at, Some(chosen));
    Ok(())
}

#[test]
fn counter_reset_requires_operator_and_zeroes_counters() -> TestResult {
    let (store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;
    let target = register(&admin, "acct-target", Role::Standard)?;
    store.try_consume_analysis(&target.account_id, 20)?;

    let record = admin.reset_counters(&operator, &target.account_id)?;
    assert_eq!(record.lifetime_analysis_count, 0);
    assert_eq!(record.lifetime_weekly_report_count, 0);
    Ok(())
}

#[test]
fn notice_acknowledgement_is_a_self_service_operation() -> TestResult {
    let (_store, admin) = service();
    let operator = register(&admin, "acct-op", Role::Superadmin)?;
    let target = register(&admin, "acct-target", Role::Standard)?;
    admin.grant_deep(&operator, &target.account_id, GrantExpiry::OneMonth, now())?;

    let record = admin.mark_notice_seen(&target)?;
    assert!(record.has_seen_upgrade_notice);
    assert!(record.was_admin_upgraded);
    Ok(())
}

#[test]
fn account_deletion_cascades_and_checks_ownership() -> TestResult {
    let (store, admin) = service();
    let holder = register(&admin, "acct-holder", Role::Standard)?;
    let other = register(&admin, "acct-other", Role::Standard)?;
    store.record_entry_day(&holder.account_id, date!(2026 - 01 - 30))?;

    match admin.delete_account(&other, &holder.account_id) {
        Err(AuthorityError::Forbidden(_)) => {}
        outcome => return Err(format!("expected forbidden, got {outcome:?}").into()),
    }

    admin.delete_account(&holder, &holder.account_id)?;
    assert!(store.load_account(&holder.account_id)?.is_none());
    assert!(store.load_entitlement(&holder.account_id)?.is_none());
    Ok(())
}
