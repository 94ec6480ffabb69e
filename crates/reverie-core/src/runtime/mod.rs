// crates/reverie-core/src/runtime/mod.rs
// ============================================================================
// Module: Reverie Runtime
// Description: Enforcement and administration services over store seams.
// Purpose: Group the stateful services that drive entitlement decisions.
// Dependencies: crate::{core, interfaces, telemetry}
// ============================================================================

//! ## Overview
//! Runtime services compose the pure core model with a record store. Each
//! inbound request is an independent short-lived unit of work; services hold
//! no per-request state and are shared behind [`std::sync::Arc`] at the edge.

/// Administrative and registration operations.
pub mod admin;
/// Quota authorization and commit paths.
pub mod enforcer;
/// Mutex-guarded store for tests.
pub mod memory;
