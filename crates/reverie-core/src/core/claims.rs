// crates/reverie-core/src/core/claims.rs
// ============================================================================
// Module: Reverie Identity Claims
// Description: Identity claim fields carried inside signed credentials.
// Purpose: Define the authenticated identity surface used by every decision.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! An identity claim is the set of fields embedded in a signed credential.
//! Claims are immutable once issued and are never persisted; the account
//! record remains the source of truth for role changes, which take effect on
//! the next credential issuance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Account role carried in claims and account records.
///
/// # Invariants
/// - Variants are stable for serialization and token payloads.
/// - [`Role::Superadmin`] bypasses all plan-based quota checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account holder.
    Standard,
    /// Operator role with unrestricted access to metered actions and
    /// administrative operations.
    Superadmin,
}

impl Role {
    /// Returns a stable label for the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Superadmin => "superadmin",
        }
    }
}

// ============================================================================
// SECTION: Identity Claim
// ============================================================================

/// Identity fields embedded in a signed credential.
///
/// # Invariants
/// - Immutable once issued; carries no usage or plan state.
/// - Expiry is enforced by the credential verifier, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Account identifier the credential was issued to.
    pub account_id: AccountId,
    /// Account email address at issuance time.
    pub email: String,
    /// Optional display name at issuance time.
    pub display_name: Option<String>,
    /// Account role at issuance time.
    pub role: Role,
}

impl IdentityClaim {
    /// Returns true when the claim carries the superadmin role.
    #[must_use]
    pub const fn is_superadmin(&self) -> bool {
        matches!(self.role, Role::Superadmin)
    }
}
