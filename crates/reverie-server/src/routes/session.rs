// crates/reverie-server/src/routes/session.rs
// ============================================================================
// Module: Session Routes
// Description: Session issuance and teardown for browser clients.
// Purpose: Mint credentials and set the session cookie on login.
// Dependencies: axum, crate::{collaborators, error, state}, reverie-core
// ============================================================================

//! ## Overview
//! Login is the separate write operation behind session resolution: the
//! login gateway checks credentials, the token authority mints a seven-day
//! credential, and the response carries it both as a body field (non-browser
//! clients) and as the session cookie (browser clients).

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use reverie_core::AuthorityError;
use serde::Serialize;

use crate::collaborators::LoginError;
use crate::collaborators::LoginRequest;
use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// SECTION: Bodies
// ============================================================================

/// Login response body.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    /// Freshly minted credential for bearer-channel clients.
    pub token: String,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /session` — authenticate and establish a session.
///
/// # Errors
///
/// Returns the uniform unauthenticated rejection on credential mismatch and
/// a bad-gateway rejection when the login backend is unreachable.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let account = state.login.authenticate(&request).map_err(|error| match error {
        LoginError::InvalidCredentials => ApiError::from(AuthorityError::Unauthenticated),
        LoginError::Unavailable(detail) => {
            ApiError::from(AuthorityError::ExternalServiceUnavailable(detail))
        }
    })?;
    let now = state.clock.now();
    let token = state
        .resolver
        .authority()
        .issue(&account.to_claim(), now)
        .map_err(|error| ApiError::from(AuthorityError::ExternalServiceUnavailable(error.to_string())))?;
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&state.cookie.issue(&token)) {
        headers.insert(header::SET_COOKIE, value);
    }
    Ok((StatusCode::OK, headers, Json(SessionBody { token })).into_response())
}

/// `POST /session/logout` — clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&state.cookie.clear()) {
        headers.insert(header::SET_COOKIE, value);
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}
