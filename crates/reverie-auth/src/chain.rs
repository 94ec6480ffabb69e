// crates/reverie-auth/src/chain.rs
// ============================================================================
// Module: Credential Source Chain
// Description: Ordered credential lookup across transport channels.
// Purpose: Resolve an authenticated identity from a request, or nothing.
// Dependencies: crate::token, reverie-core
// ============================================================================

//! ## Overview
//! Session resolution is an explicit ordered chain of credential sources:
//! the bearer header first (non-browser clients that cannot rely on cookie
//! jars), then the session cookie (browser sessions). The resolver verifies
//! each located token in order and short-circuits on the first success, so a
//! client presenting an explicit bearer credential is never silently
//! overridden by a stale cookie.
//!
//! Resolution is side-effect free. Establishing a session (minting a token
//! and setting the cookie) is a separate write operation in
//! [`crate::cookie`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use reverie_core::IdentityClaim;
use reverie_core::Timestamp;

use crate::token::TokenAuthority;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Cookie name carrying the session credential.
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Bearer scheme prefix on the authorization header.
const BEARER_PREFIX: &str = "Bearer ";

// ============================================================================
// SECTION: Carrier
// ============================================================================

/// Request-side view of the credential transport headers.
///
/// The server boundary implements this for its request type; tests implement
/// it over plain strings.
pub trait CredentialCarrier {
    /// Returns the raw `Authorization` header value, if present.
    fn authorization_header(&self) -> Option<&str>;

    /// Returns the raw `Cookie` header value, if present.
    fn cookie_header(&self) -> Option<&str>;
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// A single credential transport channel.
pub trait CredentialSource: Send + Sync {
    /// Stable label for telemetry and tests.
    fn label(&self) -> &'static str;

    /// Locates a raw token on the carrier, without verifying it.
    fn locate(&self, carrier: &dyn CredentialCarrier) -> Option<String>;
}

/// Bearer-header credential source.
///
/// # Invariants
/// - Only the `Bearer` scheme is recognized; other schemes yield nothing.
pub struct BearerSource;

impl CredentialSource for BearerSource {
    fn label(&self) -> &'static str {
        "bearer_header"
    }

    fn locate(&self, carrier: &dyn CredentialCarrier) -> Option<String> {
        let token = carrier.authorization_header()?.strip_prefix(BEARER_PREFIX)?;
        if token.is_empty() { None } else { Some(token.to_string()) }
    }
}

/// Session-cookie credential source.
///
/// # Invariants
/// - Only the configured cookie name is read; other cookies are ignored.
pub struct CookieSource {
    /// Cookie name to read.
    name: String,
}

impl CookieSource {
    /// Creates a source reading the given cookie name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for CookieSource {
    fn default() -> Self {
        Self::new(SESSION_COOKIE_NAME)
    }
}

impl CredentialSource for CookieSource {
    fn label(&self) -> &'static str {
        "session_cookie"
    }

    fn locate(&self, carrier: &dyn CredentialCarrier) -> Option<String> {
        let header = carrier.cookie_header()?;
        header.split(';').map(str::trim).find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            if name == self.name && !value.is_empty() { Some(value.to_string()) } else { None }
        })
    }
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Ordered credential resolver over the configured sources.
///
/// # Invariants
/// - Sources are consulted strictly in order; the first token that verifies
///   wins.
/// - Verification failures are silent; a located-but-invalid token simply
///   lets the chain continue.
pub struct SessionResolver {
    /// Verifier shared with session issuance.
    authority: TokenAuthority,
    /// Ordered credential sources.
    sources: Vec<Box<dyn CredentialSource>>,
}

impl SessionResolver {
    /// Creates the standard chain: bearer header, then session cookie.
    #[must_use]
    pub fn new(authority: TokenAuthority) -> Self {
        Self::with_sources(
            authority,
            vec![Box::new(BearerSource), Box::new(CookieSource::default())],
        )
    }

    /// Creates a resolver with an explicit source chain.
    #[must_use]
    pub fn with_sources(
        authority: TokenAuthority,
        sources: Vec<Box<dyn CredentialSource>>,
    ) -> Self {
        Self { authority, sources }
    }

    /// Returns the verifier backing this resolver.
    #[must_use]
    pub const fn authority(&self) -> &TokenAuthority {
        &self.authority
    }

    /// Resolves an authenticated identity from the carrier, or nothing.
    #[must_use]
    pub fn resolve(
        &self,
        carrier: &dyn CredentialCarrier,
        now: Timestamp,
    ) -> Option<IdentityClaim> {
        self.sources
            .iter()
            .find_map(|source| {
                let token = source.locate(carrier)?;
                self.authority.verify(&token, now)
            })
    }
}
