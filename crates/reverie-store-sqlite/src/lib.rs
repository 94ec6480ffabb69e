// crates/reverie-store-sqlite/src/lib.rs
// ============================================================================
// Module: Reverie SQLite Store
// Description: Durable record store for the entitlement authority.
// Purpose: Provide the production AuthorityStore implementation.
// Dependencies: reverie-core, rusqlite, serde, thiserror, time
// ============================================================================

//! ## Overview
//! `reverie-store-sqlite` implements every `reverie-core` store seam over a
//! single `SQLite` database: accounts, entitlements, report records, and
//! journal entry dates. Quota-consuming operations are atomic at the
//! statement or transaction level, closing same-account commit races.

/// Store implementation and configuration.
pub mod store;

pub use crate::store::SqliteAuthorityStore;
pub use crate::store::SqliteJournalMode;
pub use crate::store::SqliteStoreConfig;
pub use crate::store::SqliteSyncMode;
