// crates/reverie-core/tests/entitlement_transitions.rs
// ============================================================================
// Module: Entitlement Transition Tests
// Description: Validate the entitlement state machine field-by-field.
// Purpose: Ensure each update intent touches exactly its fixed field set.
// Dependencies: reverie-core
// ============================================================================

//! State machine behavior tests for entitlement records.

use reverie_core::AccountId;
use reverie_core::EntitlementRecord;
use reverie_core::EntitlementUpdate;
use reverie_core::GrantChannel;
use reverie_core::Plan;
use reverie_core::PlanState;
use reverie_core::Timestamp;

/// Fixed decision instant used across cases.
const NOW: Timestamp = Timestamp::from_unix_millis(1_754_000_000_000);

/// Builds a fresh free-tier record.
fn free_record() -> EntitlementRecord {
    EntitlementRecord::new_free(AccountId::new("acct-1"))
}

#[test]
fn registration_record_is_free_with_zeroed_counters() {
    let record = free_record();
    assert_eq!(record.plan, Plan::Free);
    assert_eq!(record.plan_expires_at, None);
    assert_eq!(record.lifetime_analysis_count, 0);
    assert_eq!(record.lifetime_weekly_report_count, 0);
    assert!(!record.was_admin_upgraded);
    assert!(record.has_seen_upgrade_notice);
}

#[test]
fn first_admin_grant_sets_upgrade_notice_flags() {
    let mut record = free_record();
    let expires_at = NOW.plus_days(30);
    record.apply(&EntitlementUpdate::GrantDeep { expires_at, channel: GrantChannel::Admin });
    assert_eq!(record.plan, Plan::Deep);
    assert_eq!(record.plan_expires_at, Some(expires_at));
    assert!(record.was_admin_upgraded);
    assert!(!record.has_seen_upgrade_notice);
}

#[test]
fn billing_grant_never_touches_upgrade_notice_flags() {
    let mut record = free_record();
    record.apply(&EntitlementUpdate::GrantDeep {
        expires_at: NOW.plus_days(30),
        channel: GrantChannel::Billing,
    });
    assert!(!record.was_admin_upgraded);
    assert!(record.has_seen_upgrade_notice);
}

#[test]
fn admin_regrant_to_active_account_updates_expiry_only() {
    let mut record = free_record();
    record.apply(&EntitlementUpdate::GrantDeep {
        expires_at: NOW.plus_days(30),
        channel: GrantChannel::Admin,
    });
    record.apply(&EntitlementUpdate::MarkUpgradeNoticeSeen);
    let extended = NOW.plus_days(90);
    record.apply(&EntitlementUpdate::GrantDeep { expires_at: extended, channel: GrantChannel::Admin });
    assert_eq!(record.plan_expires_at, Some(extended));
    // Already paid: the one-time notice does not re-fire.
    assert!(record.has_seen_upgrade_notice);
}

#[test]
fn renewal_is_state_setting_and_idempotent() {
    let mut record = free_record();
    let period_end = NOW.plus_days(31);
    record.apply(&EntitlementUpdate::RenewDeep { expires_at: period_end });
    let once = record.clone();
    record.apply(&EntitlementUpdate::RenewDeep { expires_at: period_end });
    assert_eq!(record, once);
    assert_eq!(record.plan_state(NOW), PlanState::DeepActive);
}

#[test]
fn downgrade_clears_expiry_and_admin_flag() {
    let mut record = free_record();
    record.apply(&EntitlementUpdate::GrantDeep {
        expires_at: NOW.plus_days(30),
        channel: GrantChannel::Admin,
    });
    record.apply(&EntitlementUpdate::Downgrade { channel: GrantChannel::Billing });
    assert_eq!(record.plan, Plan::Free);
    assert_eq!(record.plan_expires_at, None);
    assert!(!record.was_admin_upgraded);
}

#[test]
fn lazy_expire_corrects_plan_without_touching_flags_or_counters() {
    let mut record = free_record();
    record.apply(&EntitlementUpdate::GrantDeep {
        expires_at: NOW.plus_days(-1),
        channel: GrantChannel::Admin,
    });
    record.lifetime_analysis_count = 7;
    assert!(record.needs_lazy_correction(NOW));
    record.apply(&EntitlementUpdate::LazyExpire);
    assert_eq!(record.plan, Plan::Free);
    assert_eq!(record.plan_expires_at, None);
    assert_eq!(record.lifetime_analysis_count, 7);
    assert!(record.was_admin_upgraded);
    assert!(!record.needs_lazy_correction(NOW));
}

#[test]
fn counter_reset_zeroes_both_counters() {
    let mut record = free_record();
    record.lifetime_analysis_count = 20;
    record.lifetime_weekly_report_count = 3;
    record.apply(&EntitlementUpdate::ResetCounters);
    assert_eq!(record.lifetime_analysis_count, 0);
    assert_eq!(record.lifetime_weekly_report_count, 0);
}

#[test]
fn plan_state_derivation_covers_all_shapes() {
    let mut record = free_record();
    assert_eq!(record.plan_state(NOW), PlanState::Free);

    record.apply(&EntitlementUpdate::RenewDeep { expires_at: NOW.plus_days(1) });
    assert_eq!(record.plan_state(NOW), PlanState::DeepActive);

    record.apply(&EntitlementUpdate::RenewDeep { expires_at: NOW.plus_days(-1) });
    assert_eq!(record.plan_state(NOW), PlanState::DeepExpired);

    // A paid plan with no expiry is stale by definition.
    record.plan_expires_at = None;
    assert_eq!(record.plan_state(NOW), PlanState::DeepExpired);
}

#[test]
fn expiry_boundary_instant_is_not_active() {
    let mut record = free_record();
    let expires_at = NOW;
    record.apply(&EntitlementUpdate::RenewDeep { expires_at });
    assert_eq!(record.plan_state(NOW), PlanState::DeepExpired);
}
