// crates/reverie-server/src/security.rs
// ============================================================================
// Module: Security Helpers
// Description: Constant-time comparison helpers for shared secrets.
// Purpose: Keep secret checks free of timing side channels.
// Dependencies: subtle
// ============================================================================

//! ## Overview
//! The admin bootstrap secret is compared with constant-time equality so a
//! caller cannot probe the secret byte-by-byte through response timing.
//! Length mismatches short-circuit, which leaks only the length.

// ============================================================================
// SECTION: Imports
// ============================================================================

use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Compares two byte strings in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
