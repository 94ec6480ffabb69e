// crates/reverie-auth/src/lib.rs
// ============================================================================
// Module: Reverie Auth
// Description: Credential verification and session resolution.
// Purpose: Prove who is making a request from either transport channel.
// Dependencies: jsonwebtoken, reverie-core, serde, thiserror
// ============================================================================

//! ## Overview
//! `reverie-auth` implements the credential side of the authority: the
//! HS256 token authority, the ordered credential source chain (bearer
//! header, then session cookie), and the session cookie builder. Everything
//! here is stateless; entitlement state lives behind the store seams in
//! `reverie-core`.

/// Credential sources and the session resolver.
pub mod chain;
/// Session cookie construction.
pub mod cookie;
/// Token minting and verification.
pub mod token;

pub use crate::chain::BearerSource;
pub use crate::chain::CookieSource;
pub use crate::chain::CredentialCarrier;
pub use crate::chain::CredentialSource;
pub use crate::chain::SESSION_COOKIE_NAME;
pub use crate::chain::SessionResolver;
pub use crate::cookie::SessionCookie;
pub use crate::token::IssueError;
pub use crate::token::TOKEN_TTL_SECONDS;
pub use crate::token::TokenAuthority;
