// crates/reverie-billing/src/signature.rs
// ============================================================================
// Module: Webhook Signature
// Description: HMAC-SHA256 verification of raw webhook bodies.
// Purpose: Reject unauthenticated billing events before any parsing.
// Dependencies: hex, hmac, sha2
// ============================================================================

//! ## Overview
//! Inbound billing events are authenticated by a provider-supplied
//! hex-encoded HMAC-SHA256 signature over the raw request body. Verification
//! runs before the body is parsed; a failed check rejects the event outright
//! and no state transition is attempted. Comparison is constant-time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

/// HMAC-SHA256 instance type.
type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Webhook signature verifier over the shared webhook secret.
///
/// # Invariants
/// - Verification compares full-length digests in constant time.
/// - The secret is never echoed in errors or telemetry.
pub struct WebhookVerifier {
    /// Shared webhook secret bytes.
    secret: Vec<u8>,
}

impl WebhookVerifier {
    /// Creates a verifier over the shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self { secret: secret.to_vec() }
    }

    /// Computes the hex signature for a body (used by tests and clients).
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> String {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            // HMAC accepts keys of any length; this arm is unreachable but
            // kept total rather than panicking.
            return String::new();
        };
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a hex signature over the raw body.
    ///
    /// Returns false for malformed hex, truncated digests, and mismatches
    /// alike; callers reject all three identically.
    #[must_use]
    pub fn verify(&self, body: &[u8], signature_hex: &str) -> bool {
        let Ok(provided) = hex::decode(signature_hex.trim()) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret) else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&provided).is_ok()
    }
}
