// crates/reverie-core/src/core/quota.rs
// ============================================================================
// Module: Reverie Quota Model
// Description: Metered action kinds, limits, decisions, and redaction.
// Purpose: Define the allow/deny surface for metered actions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Quota decisions are plain data so callers and audit sinks observe the
//! same outcome. A denial always carries a caller-facing remedy: upgrade or
//! wait for the counter-bound reasons, record more days for the
//! precondition-bound one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Action Kinds
// ============================================================================

/// Metered action kinds gated by the enforcer.
///
/// # Invariants
/// - Variants are stable for serialization and telemetry labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Single-entry dream analysis.
    SingleAnalysis,
    /// Weekly report generation.
    WeeklyReport,
}

impl ActionKind {
    /// Returns a stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleAnalysis => "single_analysis",
            Self::WeeklyReport => "weekly_report",
        }
    }
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Configured quota limits for metered actions.
///
/// # Invariants
/// - All limits are at least 1; configuration validation enforces this
///   before a limits value reaches the enforcer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimits {
    /// Lifetime single-analysis cap for free accounts.
    pub free_analysis_limit: u32,
    /// Lifetime weekly-report cap for free accounts.
    pub free_report_lifetime_limit: u32,
    /// Per-calendar-week report cap for paid accounts.
    pub deep_reports_per_week: u32,
    /// Minimum distinct recorded days required of free accounts.
    pub free_min_distinct_days: u32,
    /// Minimum distinct recorded days required of paid accounts.
    pub deep_min_distinct_days: u32,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            free_analysis_limit: 20,
            free_report_lifetime_limit: 3,
            deep_reports_per_week: 2,
            free_min_distinct_days: 5,
            deep_min_distinct_days: 3,
        }
    }
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Reason attached to a quota denial.
///
/// # Invariants
/// - Variants are stable for programmatic handling; the caller-facing
///   remedy differs per reason (upgrade/wait versus record more days).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Usage limit reached.
    QuotaExceeded,
    /// Not enough distinct recorded days in the current week.
    InsufficientDays,
}

/// Outcome of a single authorization decision.
///
/// # Invariants
/// - `Allowed { consumes_quota: true }` obliges the caller to commit exactly
///   one unit after the metered work succeeds, and only then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuotaDecision {
    /// Action may proceed.
    Allowed {
        /// Whether a successful completion must consume one quota unit.
        consumes_quota: bool,
    },
    /// Action is denied.
    Denied {
        /// Stable denial reason.
        reason: DenyReason,
        /// Caller-facing remedy message.
        message: String,
    },
}

impl QuotaDecision {
    /// Returns true when the decision allows the action.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

// ============================================================================
// SECTION: Analysis Redaction
// ============================================================================

/// Structured outcome of a single-entry analysis.
///
/// # Invariants
/// - `full_analysis` and `reflection` are the paid-tier fields; the
///   enforcement boundary strips them for free callers before the outcome is
///   returned or persisted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Short summary visible to every tier.
    pub summary: String,
    /// One-word mood tag visible to every tier.
    pub vibe: String,
    /// Full analysis text (paid tier).
    pub full_analysis: Option<String>,
    /// Guided reflection prompt (paid tier).
    pub reflection: Option<String>,
}

impl AnalysisOutcome {
    /// Strips the paid-tier fields for non-premium callers.
    ///
    /// The underlying analysis may compute more than the free tier sees;
    /// withholding happens here, at the enforcement boundary, not at
    /// generation.
    #[must_use]
    pub fn redacted_for_plan(mut self, premium: bool) -> Self {
        if !premium {
            self.full_analysis = None;
            self.reflection = None;
        }
        self
    }
}
