// crates/reverie-core/src/core/mod.rs
// ============================================================================
// Module: Reverie Core Domain
// Description: Domain types for identity, entitlement, quota, and time.
// Purpose: Group the pure data model used by every authority surface.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! The core domain is pure data plus deterministic transition functions. It
//! performs no I/O and never reads wall-clock time; stores and hosts supply
//! both.

/// Identity-side account records.
pub mod account;
/// Identity claims and roles.
pub mod claims;
/// Entitlement records and update intents.
pub mod entitlement;
/// Opaque identifiers.
pub mod identifiers;
/// Quota model: actions, limits, decisions, redaction.
pub mod quota;
/// Explicit timestamps and calendar week windows.
pub mod time;
