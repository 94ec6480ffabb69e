// crates/reverie-server/src/extract.rs
// ============================================================================
// Module: Identity Extraction
// Description: Axum extractors running the credential source chain.
// Purpose: Resolve request identity once, before handler logic runs.
// Dependencies: axum, reverie-auth, reverie-core
// ============================================================================

//! ## Overview
//! The extractors adapt request headers to the credential carrier seam and
//! run the ordered source chain (bearer header, then session cookie).
//! [`MaybeIdentity`] never rejects; [`RequireIdentity`] rejects with the
//! uniform unauthenticated error, revealing nothing about why resolution
//! failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header;
use axum::http::request::Parts;
use reverie_auth::CredentialCarrier;
use reverie_core::AuthorityError;
use reverie_core::IdentityClaim;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// SECTION: Header Carrier
// ============================================================================

/// Credential carrier view over request headers.
pub struct HeaderCarrier<'a> {
    /// Borrowed request headers.
    headers: &'a HeaderMap,
}

impl<'a> HeaderCarrier<'a> {
    /// Wraps a header map.
    #[must_use]
    pub const fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }
}

impl CredentialCarrier for HeaderCarrier<'_> {
    fn authorization_header(&self) -> Option<&str> {
        self.headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok())
    }

    fn cookie_header(&self) -> Option<&str> {
        self.headers.get(header::COOKIE).and_then(|value| value.to_str().ok())
    }
}

// ============================================================================
// SECTION: Extractors
// ============================================================================

/// Optional request identity.
///
/// # Invariants
/// - Never rejects; absence and invalid credentials both yield `None`.
pub struct MaybeIdentity(pub Option<IdentityClaim>);

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let carrier = HeaderCarrier::new(&parts.headers);
        let now = state.clock.now();
        Ok(Self(state.resolver.resolve(&carrier, now)))
    }
}

/// Required request identity.
///
/// # Invariants
/// - Rejection is uniform; it never distinguishes a missing credential from
///   a tampered one.
pub struct RequireIdentity(pub IdentityClaim);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let carrier = HeaderCarrier::new(&parts.headers);
        let now = state.clock.now();
        state
            .resolver
            .resolve(&carrier, now)
            .map(Self)
            .ok_or_else(|| ApiError::from(AuthorityError::Unauthenticated))
    }
}
