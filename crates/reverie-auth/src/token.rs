// crates/reverie-auth/src/token.rs
// ============================================================================
// Module: Token Authority
// Description: HS256 credential minting and silent verification.
// Purpose: Bind identity claims to compact signed tokens with a fixed TTL.
// Dependencies: jsonwebtoken, reverie-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Credentials are compact signed tokens carrying the identity claim plus
//! issued-at and expiry instants. The algorithm is pinned to a single
//! symmetric HMAC scheme; tokens presenting any other algorithm are
//! rejected.
//!
//! Verification is silent: every failure mode collapses to `None`, because
//! token tampering and token absence are adversarially indistinguishable and
//! must not leak information through differing error behavior. Expiry is
//! checked against the caller-supplied instant, keeping verification a pure
//! function of (token, secret, now).

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use reverie_core::AccountId;
use reverie_core::IdentityClaim;
use reverie_core::Role;
use reverie_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Credential lifetime: seven days.
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The single accepted signing algorithm.
const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when minting a credential.
///
/// Verification has no error surface by design; see the module overview.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Token serialization or signing failed.
    #[error("credential signing failed: {0}")]
    Signing(String),
}

// ============================================================================
// SECTION: Wire Claims
// ============================================================================

/// Token payload on the wire.
///
/// # Invariants
/// - `exp` is always present; decoding rejects payloads without it.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// Account identifier (subject).
    sub: String,
    /// Account email at issuance.
    email: String,
    /// Optional display name at issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    /// Account role at issuance.
    role: Role,
    /// Issued-at instant (unix seconds).
    iat: i64,
    /// Expiry instant (unix seconds).
    exp: i64,
}

// ============================================================================
// SECTION: Token Authority
// ============================================================================

/// Mints and verifies signed identity credentials.
///
/// # Invariants
/// - Only [`TOKEN_ALGORITHM`] is accepted on decode.
/// - Verification performs no I/O and reads no wall-clock time.
pub struct TokenAuthority {
    /// Signing key derived from the server secret.
    encoding: EncodingKey,
    /// Verification key derived from the server secret.
    decoding: DecodingKey,
    /// Credential lifetime in seconds.
    ttl_seconds: i64,
    /// Pinned decode validation (algorithm and required claims).
    validation: Validation,
}

impl TokenAuthority {
    /// Creates a token authority over the server secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, TOKEN_TTL_SECONDS)
    }

    /// Creates a token authority with an explicit TTL in seconds.
    #[must_use]
    pub fn with_ttl(secret: &[u8], ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is validated against the caller-supplied instant instead of
        // the library's wall-clock read.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
            validation,
        }
    }

    /// Mints a signed credential for the claim.
    ///
    /// # Errors
    ///
    /// Returns [`IssueError::Signing`] when encoding fails.
    pub fn issue(&self, claim: &IdentityClaim, now: Timestamp) -> Result<String, IssueError> {
        let issued_at = now.as_unix_millis().div_euclid(1_000);
        let claims = TokenClaims {
            sub: claim.account_id.to_string(),
            email: claim.email.clone(),
            name: claim.display_name.clone(),
            role: claim.role,
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)
            .map_err(|error| IssueError::Signing(error.to_string()))
    }

    /// Verifies a credential and extracts its claim.
    ///
    /// Returns `None` for any failure: bad signature, wrong algorithm,
    /// malformed payload, or an expiry at or before `now`.
    #[must_use]
    pub fn verify(&self, token: &str, now: Timestamp) -> Option<IdentityClaim> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).ok()?;
        let now_seconds = now.as_unix_millis().div_euclid(1_000);
        if data.claims.exp <= now_seconds {
            return None;
        }
        Some(IdentityClaim {
            account_id: AccountId::new(data.claims.sub),
            email: data.claims.email,
            display_name: data.claims.name,
            role: data.claims.role,
        })
    }
}
