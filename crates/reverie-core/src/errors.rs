// crates/reverie-core/src/errors.rs
// ============================================================================
// Module: Authority Errors
// Description: Caller-facing error taxonomy for the entitlement authority.
// Purpose: Provide one stable failure surface across runtime operations.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The taxonomy separates failures by the remedy available to the caller:
//! authenticate, obtain privileges, upgrade or wait, record more days, or
//! retry later. Credential verification failures never reach this surface;
//! they are normalized to "no identity" at the session resolver so token
//! tampering and token absence are indistinguishable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::time::TimeError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Authority Error
// ============================================================================

/// Caller-facing failure taxonomy for authority operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling and HTTP mapping.
/// - Messages never reveal whether a credential "almost" matched.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// No valid credential was found by either transport channel.
    #[error("authentication required")]
    Unauthenticated,
    /// Valid identity with insufficient role or ownership.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Usage limit reached; the message carries the remedy hint.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Structural requirement unmet; the message carries the remedy hint.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    /// External collaborator unreachable or unusable; quota untouched.
    #[error("external service unavailable: {0}")]
    ExternalServiceUnavailable(String),
    /// Record store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Calendar conversion failure on a supplied instant.
    #[error(transparent)]
    Time(#[from] TimeError),
}
