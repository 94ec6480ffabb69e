// crates/reverie-server/src/error.rs
// ============================================================================
// Module: API Error Mapping
// Description: HTTP mapping for the authority error taxonomy.
// Purpose: Surface structured rejections with stable reason codes.
// Dependencies: axum, reverie-core, serde
// ============================================================================

//! ## Overview
//! Every handler failure flows through [`ApiError`], which pairs an HTTP
//! status with a stable reason code and the caller-facing message. Quota and
//! precondition denials stay distinguishable by reason code because the
//! caller's remedy differs (upgrade/wait versus record more days).

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use reverie_core::AuthorityError;
use reverie_core::DenyReason;
use reverie_core::StoreError;
use serde::Serialize;

// ============================================================================
// SECTION: Error Body
// ============================================================================

/// Structured rejection body.
///
/// # Invariants
/// - `reason` values are stable for programmatic handling.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable reason code.
    pub reason: &'static str,
    /// Caller-facing message.
    pub message: String,
}

// ============================================================================
// SECTION: API Error
// ============================================================================

/// Handler error carrying its HTTP mapping.
///
/// # Invariants
/// - Internal store detail never reaches response bodies.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status for the rejection.
    pub status: StatusCode,
    /// Structured body.
    pub body: ErrorBody,
}

impl ApiError {
    /// Builds an error from its parts.
    #[must_use]
    pub fn new(status: StatusCode, reason: &'static str, message: impl Into<String>) -> Self {
        Self { status, body: ErrorBody { reason, message: message.into() } }
    }

    /// Uniform rejection for the admin bootstrap channel: missing and wrong
    /// secrets are indistinguishable.
    #[must_use]
    pub fn bootstrap_rejection() -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", "forbidden")
    }
}

impl From<AuthorityError> for ApiError {
    fn from(error: AuthorityError) -> Self {
        match error {
            AuthorityError::Unauthenticated => Self::new(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "authentication required",
            ),
            AuthorityError::Forbidden(message) => {
                Self::new(StatusCode::FORBIDDEN, "forbidden", message)
            }
            AuthorityError::QuotaExceeded(message) => {
                Self::new(StatusCode::FORBIDDEN, "quota_exceeded", message)
            }
            AuthorityError::PreconditionFailed(message) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "precondition_failed", message)
            }
            AuthorityError::ExternalServiceUnavailable(message) => Self::new(
                StatusCode::BAD_GATEWAY,
                "external_service_unavailable",
                message,
            ),
            AuthorityError::Store(StoreError::AccountNotFound(account)) => Self::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("account not found: {account}"),
            ),
            AuthorityError::Store(_) | AuthorityError::Time(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal error",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Converts a quota denial into its rejection error.
#[must_use]
pub fn denial_to_error(reason: DenyReason, message: String) -> ApiError {
    match reason {
        DenyReason::QuotaExceeded => {
            ApiError::from(AuthorityError::QuotaExceeded(message))
        }
        DenyReason::InsufficientDays => {
            ApiError::from(AuthorityError::PreconditionFailed(message))
        }
    }
}
