// crates/reverie-server/src/collaborators.rs
// ============================================================================
// Module: External Collaborators
// Description: Trait seams for the analysis, report, and login services.
// Purpose: Keep SaaS-backed collaborators behind deterministic interfaces.
// Dependencies: reverie-core, serde, thiserror
// ============================================================================

//! ## Overview
//! The LLM analysis call, the report builder, and the credential check
//! behind login are external collaborators: opaque functions that succeed
//! with structured output or fail. A collaborator failure during a metered
//! action must leave quota counters untouched, which the metered routes
//! guarantee by committing only after success.
//!
//! Deployments construct each collaborator once and hand it to
//! [`crate::state::AppState`] for the process lifetime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reverie_core::AccountId;
use reverie_core::AccountRecord;
use reverie_core::AnalysisOutcome;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Collaborator failure.
///
/// # Invariants
/// - Never treated as success; never consumes quota.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or returned an unusable
    /// response.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Login failure.
///
/// # Invariants
/// - Invalid credentials never reveal whether the email exists.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Credentials did not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The credential backend could not be reached.
    #[error("login backend unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Requests and Outputs
// ============================================================================

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Weekly report produced by the report builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    /// Narrative text covering the week.
    pub narrative: String,
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// Single-entry analysis collaborator (LLM-backed in production).
pub trait AnalysisEngine: Send + Sync {
    /// Analyzes one journal entry into a structured outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the service is unreachable or its
    /// response is unusable.
    fn analyze(&self, entry_text: &str) -> Result<AnalysisOutcome, CollaboratorError>;
}

/// Weekly report collaborator.
pub trait ReportBuilder: Send + Sync {
    /// Builds the weekly report for an account.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the service is unreachable or its
    /// response is unusable.
    fn build(&self, account: &AccountId) -> Result<WeeklyReport, CollaboratorError>;
}

/// Credential check behind session issuance.
pub trait LoginGateway: Send + Sync {
    /// Authenticates a login request and returns the account record.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidCredentials`] on mismatch and
    /// [`LoginError::Unavailable`] on backend failure.
    fn authenticate(&self, request: &LoginRequest) -> Result<AccountRecord, LoginError>;
}
