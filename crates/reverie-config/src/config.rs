// crates/reverie-config/src/config.rs
// ============================================================================
// Module: Authority Configuration
// Description: Configuration sections for secrets, quotas, and sessions.
// Purpose: Validate deployment settings fail-closed before services start.
// Dependencies: reverie-core, serde, thiserror, time, toml
// ============================================================================

//! ## Overview
//! Configuration is parsed from TOML, rejects unknown fields, and must pass
//! [`AuthorityConfig::validate`] before any service is constructed. Every
//! secret check fails closed: empty, whitespace-bearing, too-short, and
//! too-long values are all rejected with stable messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reverie_core::QuotaLimits;
use serde::Deserialize;
use thiserror::Error;
use time::UtcOffset;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum length for any server-held secret.
pub const MIN_SECRET_LENGTH: usize = 32;
/// Maximum length for any server-held secret.
pub const MAX_SECRET_LENGTH: usize = 512;
/// Maximum credential TTL in days.
pub const MAX_TOKEN_TTL_DAYS: u32 = 90;
/// Maximum configurable quota limit.
pub const MAX_QUOTA_LIMIT: u32 = 1_000_000;
/// Maximum absolute week offset in minutes (fourteen hours).
pub const MAX_WEEK_OFFSET_MINUTES: i32 = 14 * 60;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Messages are stable; tests match on substrings.
/// - Secret values are never echoed back in messages.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A validation constraint failed.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Builds a validation error with the field name prefixed.
fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid(format!("{field}: {message}"))
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Credential signing settings.
///
/// # Invariants
/// - `secret` passes the shared secret constraints after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Symmetric signing secret for credentials.
    pub secret: String,
    /// Credential lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub ttl_days: u32,
}

/// Default credential lifetime.
const fn default_token_ttl_days() -> u32 {
    7
}

/// Administrative bootstrap settings.
///
/// # Invariants
/// - `bootstrap_secret` passes the shared secret constraints after
///   validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Shared secret for the one-time superadmin bootstrap endpoint.
    pub bootstrap_secret: String,
}

/// Billing webhook settings.
///
/// # Invariants
/// - `webhook_secret` passes the shared secret constraints after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// Shared secret for webhook signature verification.
    pub webhook_secret: String,
}

/// Quota limit settings.
///
/// # Invariants
/// - All limits are within `1..=MAX_QUOTA_LIMIT` after validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Lifetime single-analysis cap for free accounts.
    #[serde(default = "default_free_analysis_limit")]
    pub free_analysis_limit: u32,
    /// Lifetime weekly-report cap for free accounts.
    #[serde(default = "default_free_report_lifetime_limit")]
    pub free_report_lifetime_limit: u32,
    /// Per-calendar-week report cap for paid accounts.
    #[serde(default = "default_deep_reports_per_week")]
    pub deep_reports_per_week: u32,
    /// Minimum distinct recorded days required of free accounts.
    #[serde(default = "default_free_min_distinct_days")]
    pub free_min_distinct_days: u32,
    /// Minimum distinct recorded days required of paid accounts.
    #[serde(default = "default_deep_min_distinct_days")]
    pub deep_min_distinct_days: u32,
}

/// Default lifetime analysis cap.
const fn default_free_analysis_limit() -> u32 {
    20
}

/// Default lifetime report cap.
const fn default_free_report_lifetime_limit() -> u32 {
    3
}

/// Default paid weekly report cap.
const fn default_deep_reports_per_week() -> u32 {
    2
}

/// Default free-tier distinct-day requirement.
const fn default_free_min_distinct_days() -> u32 {
    5
}

/// Default paid-tier distinct-day requirement.
const fn default_deep_min_distinct_days() -> u32 {
    3
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_analysis_limit: default_free_analysis_limit(),
            free_report_lifetime_limit: default_free_report_lifetime_limit(),
            deep_reports_per_week: default_deep_reports_per_week(),
            free_min_distinct_days: default_free_min_distinct_days(),
            deep_min_distinct_days: default_deep_min_distinct_days(),
        }
    }
}

/// Week window settings.
///
/// # Invariants
/// - `utc_offset_minutes` stays within the valid offset range after
///   validation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct WeekConfig {
    /// Fixed server-local offset, in minutes east of UTC.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Session cookie settings.
///
/// # Invariants
/// - `secure` defaults to true; development environments opt out explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieConfig {
    /// Whether the session cookie carries the `Secure` attribute.
    #[serde(default = "default_cookie_secure")]
    pub secure: bool,
}

/// Default `Secure` cookie toggle.
const fn default_cookie_secure() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { secure: default_cookie_secure() }
    }
}

// ============================================================================
// SECTION: Authority Config
// ============================================================================

/// Root configuration for the entitlement authority.
///
/// # Invariants
/// - [`AuthorityConfig::validate`] must pass before services are built.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorityConfig {
    /// Credential signing settings.
    pub token: TokenConfig,
    /// Administrative bootstrap settings.
    pub admin: AdminConfig,
    /// Billing webhook settings.
    pub billing: BillingConfig,
    /// Quota limits.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Week window settings.
    #[serde(default)]
    pub week: WeekConfig,
    /// Session cookie settings.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl AuthorityConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|error| ConfigError::Parse(error.to_string()))
    }

    /// Validates every section, failing closed on the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_secret("token.secret", &self.token.secret)?;
        validate_secret("admin.bootstrap_secret", &self.admin.bootstrap_secret)?;
        validate_secret("billing.webhook_secret", &self.billing.webhook_secret)?;
        if self.token.ttl_days == 0 {
            return Err(invalid("token.ttl_days", "ttl must be at least one day"));
        }
        if self.token.ttl_days > MAX_TOKEN_TTL_DAYS {
            return Err(invalid("token.ttl_days", "ttl too long"));
        }
        validate_limit("quota.free_analysis_limit", self.quota.free_analysis_limit)?;
        validate_limit(
            "quota.free_report_lifetime_limit",
            self.quota.free_report_lifetime_limit,
        )?;
        validate_limit("quota.deep_reports_per_week", self.quota.deep_reports_per_week)?;
        validate_limit("quota.free_min_distinct_days", self.quota.free_min_distinct_days)?;
        validate_limit("quota.deep_min_distinct_days", self.quota.deep_min_distinct_days)?;
        if self.week.utc_offset_minutes.abs() > MAX_WEEK_OFFSET_MINUTES {
            return Err(invalid("week.utc_offset_minutes", "offset out of range"));
        }
        Ok(())
    }

    /// Returns the quota limits for the enforcer.
    #[must_use]
    pub const fn quota_limits(&self) -> QuotaLimits {
        QuotaLimits {
            free_analysis_limit: self.quota.free_analysis_limit,
            free_report_lifetime_limit: self.quota.free_report_lifetime_limit,
            deep_reports_per_week: self.quota.deep_reports_per_week,
            free_min_distinct_days: self.quota.free_min_distinct_days,
            deep_min_distinct_days: self.quota.deep_min_distinct_days,
        }
    }

    /// Returns the fixed server-local offset for week windows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the offset is out of range;
    /// validated configurations cannot hit this.
    pub fn week_offset(&self) -> Result<UtcOffset, ConfigError> {
        let seconds = self.week.utc_offset_minutes.saturating_mul(60);
        UtcOffset::from_whole_seconds(seconds)
            .map_err(|_| invalid("week.utc_offset_minutes", "offset out of range"))
    }

    /// Returns the credential TTL in seconds.
    #[must_use]
    pub const fn token_ttl_seconds(&self) -> i64 {
        self.token.ttl_days as i64 * 24 * 60 * 60
    }
}

// ============================================================================
// SECTION: Shared Checks
// ============================================================================

/// Applies the shared secret constraints.
fn validate_secret(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "secret must be non-empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, "secret must not contain whitespace"));
    }
    if value.len() < MIN_SECRET_LENGTH {
        return Err(invalid(field, "secret too short"));
    }
    if value.len() > MAX_SECRET_LENGTH {
        return Err(invalid(field, "secret too long"));
    }
    Ok(())
}

/// Applies the shared quota limit constraints.
fn validate_limit(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(invalid(field, "limit must be at least 1"));
    }
    if value > MAX_QUOTA_LIMIT {
        return Err(invalid(field, "limit too large"));
    }
    Ok(())
}
