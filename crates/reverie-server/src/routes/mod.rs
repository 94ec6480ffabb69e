// crates/reverie-server/src/routes/mod.rs
// ============================================================================
// Module: Route Handlers
// Description: Handler modules for the authority HTTP surface.
// Purpose: Group session, admin, billing, and metered endpoints.
// Dependencies: axum, crate::{collaborators, error, extract, state}
// ============================================================================

//! ## Overview
//! Handlers stay thin: extract identity, delegate to a service, map the
//! outcome. All policy lives in `reverie-core`; all credential handling in
//! `reverie-auth`.

/// Bootstrap and administrative operations.
pub mod admin;
/// Billing webhook ingestion.
pub mod billing;
/// Metered analysis and report endpoints.
pub mod metered;
/// Session issuance and teardown.
pub mod session;
