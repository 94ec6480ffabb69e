// crates/reverie-config/src/lib.rs
// ============================================================================
// Module: Reverie Config
// Description: Configuration model for the entitlement authority.
// Purpose: Parse and validate deployment settings before services start.
// Dependencies: reverie-core, serde, thiserror, time, toml
// ============================================================================

//! ## Overview
//! `reverie-config` holds the canonical configuration model: secrets for the
//! token authority, admin bootstrap, and billing webhook, plus quota limits,
//! the week window offset, and session cookie settings. Validation fails
//! closed; services are only constructed from validated configurations.

/// Configuration sections and validation.
pub mod config;

pub use crate::config::AdminConfig;
pub use crate::config::AuthorityConfig;
pub use crate::config::BillingConfig;
pub use crate::config::ConfigError;
pub use crate::config::CookieConfig;
pub use crate::config::MAX_QUOTA_LIMIT;
pub use crate::config::MAX_SECRET_LENGTH;
pub use crate::config::MAX_TOKEN_TTL_DAYS;
pub use crate::config::MAX_WEEK_OFFSET_MINUTES;
pub use crate::config::MIN_SECRET_LENGTH;
pub use crate::config::QuotaConfig;
pub use crate::config::TokenConfig;
pub use crate::config::WeekConfig;
