// crates/reverie-core/src/core/account.rs
// ============================================================================
// Module: Reverie Account Records
// Description: Identity-side account record persisted in the record store.
// Purpose: Hold the durable role and contact fields behind issued claims.
// Dependencies: crate::core::{claims, identifiers}, serde
// ============================================================================

//! ## Overview
//! The account record is the identity half of the record store: it owns the
//! durable role used when issuing credentials and performing administrative
//! checks. Entitlement state lives in the sibling
//! [`crate::core::entitlement::EntitlementRecord`], created alongside this
//! record at registration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::claims::IdentityClaim;
use crate::core::claims::Role;
use crate::core::identifiers::AccountId;

// ============================================================================
// SECTION: Account Record
// ============================================================================

/// Durable identity record for an account.
///
/// # Invariants
/// - `account_id` is the unique owning key shared with the entitlement record.
/// - Role changes here take effect on the next credential issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Unique account identifier.
    pub account_id: AccountId,
    /// Account email address.
    pub email: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Durable account role.
    pub role: Role,
}

impl AccountRecord {
    /// Builds the identity claim embedded in a fresh credential.
    #[must_use]
    pub fn to_claim(&self) -> IdentityClaim {
        IdentityClaim {
            account_id: self.account_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}
