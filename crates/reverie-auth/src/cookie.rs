// crates/reverie-auth/src/cookie.rs
// ============================================================================
// Module: Session Cookie
// Description: Set-Cookie construction for browser sessions.
// Purpose: Issue and clear the session cookie with fixed attributes.
// Dependencies: crate::{chain, token}
// ============================================================================

//! ## Overview
//! Browser sessions transport the credential in an http-only cookie. The
//! attribute set is fixed by contract: `HttpOnly`, `SameSite=Lax`, `Path=/`,
//! a max-age matching the credential TTL, and `Secure` in production.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::chain::SESSION_COOKIE_NAME;
use crate::token::TOKEN_TTL_SECONDS;

// ============================================================================
// SECTION: Session Cookie
// ============================================================================

/// Builder for the session `Set-Cookie` header value.
///
/// # Invariants
/// - The attribute set matches the session contract; only the `Secure`
///   toggle varies between environments.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    /// Cookie name; matches the resolver's cookie source.
    name: String,
    /// Whether to mark the cookie `Secure` (production).
    secure: bool,
    /// Cookie lifetime in seconds.
    max_age_seconds: i64,
}

impl SessionCookie {
    /// Creates the standard session cookie builder.
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            secure,
            max_age_seconds: TOKEN_TTL_SECONDS,
        }
    }

    /// Returns the cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the `Set-Cookie` value establishing a session.
    #[must_use]
    pub fn issue(&self, token: &str) -> String {
        let mut value = format!(
            "{}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, self.max_age_seconds
        );
        if self.secure {
            value.push_str("; Secure");
        }
        value
    }

    /// Builds the `Set-Cookie` value clearing a session.
    #[must_use]
    pub fn clear(&self) -> String {
        let mut value =
            format!("{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax", self.name);
        if self.secure {
            value.push_str("; Secure");
        }
        value
    }
}
