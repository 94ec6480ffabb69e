// crates/reverie-core/src/lib.rs
// ============================================================================
// Module: Reverie Core
// Description: Entitlement and session authority domain for Reverie.
// Purpose: Provide the data model, interfaces, and runtime services.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! `reverie-core` holds the entitlement and session authority of the Reverie
//! journaling service: the per-account entitlement state machine, the quota
//! enforcer for metered actions, the administrative operations, and the
//! store/clock seams the durable backends implement.
//!
//! The crate is deliberately free of I/O: time is supplied explicitly,
//! persistence goes through [`interfaces`], and observability goes through
//! [`telemetry`]. Credential handling lives in the sibling `reverie-auth`
//! crate; the HTTP boundary lives in `reverie-server`.

/// Pure domain model.
pub mod core;
/// Caller-facing error taxonomy.
pub mod errors;
/// Store and clock seams.
pub mod interfaces;
/// Enforcement, administration, and the in-memory store.
pub mod runtime;
/// Decision and billing event sinks.
pub mod telemetry;

pub use crate::core::account::AccountRecord;
pub use crate::core::claims::IdentityClaim;
pub use crate::core::claims::Role;
pub use crate::core::entitlement::EntitlementRecord;
pub use crate::core::entitlement::EntitlementUpdate;
pub use crate::core::entitlement::GrantChannel;
pub use crate::core::entitlement::Plan;
pub use crate::core::entitlement::PlanState;
pub use crate::core::identifiers::AccountId;
pub use crate::core::quota::ActionKind;
pub use crate::core::quota::AnalysisOutcome;
pub use crate::core::quota::DenyReason;
pub use crate::core::quota::QuotaDecision;
pub use crate::core::quota::QuotaLimits;
pub use crate::core::time::Timestamp;
pub use crate::core::time::WeekWindow;
pub use crate::core::time::add_calendar_months;
pub use crate::errors::AuthorityError;
pub use crate::interfaces::AccountStore;
pub use crate::interfaces::AuthorityStore;
pub use crate::interfaces::Clock;
pub use crate::interfaces::CommitOutcome;
pub use crate::interfaces::EntitlementStore;
pub use crate::interfaces::ReportConstraint;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::UsageStore;
pub use crate::runtime::admin::AdminService;
pub use crate::runtime::admin::GrantExpiry;
pub use crate::runtime::enforcer::QuotaEnforcer;
pub use crate::runtime::memory::InMemoryAuthorityStore;
pub use crate::telemetry::AuthorityTelemetry;
pub use crate::telemetry::BillingDropReason;
pub use crate::telemetry::DecisionEvent;
pub use crate::telemetry::NoopTelemetry;
