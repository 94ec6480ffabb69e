// crates/reverie-server/src/routes/admin.rs
// ============================================================================
// Module: Admin Routes
// Description: Bootstrap and administrative account operations.
// Purpose: Expose operator transitions behind role and secret checks.
// Dependencies: axum, crate::{error, extract, security, state}, reverie-core
// ============================================================================

//! ## Overview
//! The bootstrap endpoint is the one-time secret channel that creates the
//! first superadmin; missing and wrong secrets are rejected identically.
//! Every other operation here requires an authenticated superadmin and runs
//! through the admin service, which rejects self-targeted role and plan
//! changes before touching the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use reverie_core::AccountId;
use reverie_core::EntitlementRecord;
use reverie_core::GrantExpiry;
use reverie_core::Role;
use reverie_core::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ApiError;
use crate::extract::RequireIdentity;
use crate::security::constant_time_eq_str;
use crate::state::AppState;

// ============================================================================
// SECTION: Bodies
// ============================================================================

/// Bootstrap request body.
#[derive(Debug, Deserialize)]
pub struct BootstrapBody {
    /// Account to promote to superadmin.
    pub account_id: String,
    /// Email used to create the account when it does not exist yet.
    #[serde(default)]
    pub email: Option<String>,
}

/// Plan grant request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantBody {
    /// One calendar month from now.
    OneMonth,
    /// Twelve calendar months from now.
    TwelveMonths,
    /// Explicit expiry instant (unix milliseconds).
    At {
        /// Expiry instant in unix milliseconds.
        expires_at_ms: i64,
    },
}

impl GrantBody {
    /// Maps the body onto the admin service expiry selection.
    const fn to_expiry(&self) -> GrantExpiry {
        match self {
            Self::OneMonth => GrantExpiry::OneMonth,
            Self::TwelveMonths => GrantExpiry::TwelveMonths,
            Self::At { expires_at_ms } => {
                GrantExpiry::At(Timestamp::from_unix_millis(*expires_at_ms))
            }
        }
    }
}

/// Role update request body.
#[derive(Debug, Deserialize)]
pub struct RoleBody {
    /// New durable role.
    pub role: Role,
}

/// Entitlement snapshot returned from admin operations.
#[derive(Debug, Serialize)]
pub struct EntitlementBody {
    /// Resulting entitlement record.
    pub entitlement: EntitlementRecord,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /admin/bootstrap` — create or promote the first superadmin via the
/// shared secret channel.
///
/// # Errors
///
/// Returns the uniform bootstrap rejection when the secret header is absent
/// or wrong, and not-found when the account does not exist and no email was
/// supplied to create it.
pub async fn bootstrap(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BootstrapBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let presented = headers
        .get("x-admin-secret")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !constant_time_eq_str(presented, &state.bootstrap_secret) {
        return Err(ApiError::bootstrap_rejection());
    }
    let account = AccountId::new(body.account_id);
    let existing = state
        .store
        .load_account(&account)
        .map_err(reverie_core::AuthorityError::from)?;
    match (existing, body.email) {
        (Some(_), _) => {
            state
                .store
                .set_role(&account, Role::Superadmin)
                .map_err(reverie_core::AuthorityError::from)?;
        }
        (None, Some(email)) => {
            state.admin.register_account(&reverie_core::AccountRecord {
                account_id: account.clone(),
                email,
                display_name: None,
                role: Role::Superadmin,
            })?;
        }
        (None, None) => {
            return Err(ApiError::from(reverie_core::AuthorityError::Store(
                reverie_core::StoreError::AccountNotFound(account),
            )));
        }
    }
    Ok(Json(serde_json::json!({ "account_id": account, "role": Role::Superadmin })))
}

/// `POST /admin/accounts/{id}/plan` — grant the paid plan.
///
/// # Errors
///
/// Returns forbidden for non-superadmin actors and self-targeted grants.
pub async fn grant_plan(
    State(state): State<AppState>,
    RequireIdentity(actor): RequireIdentity,
    Path(id): Path<String>,
    Json(body): Json<GrantBody>,
) -> Result<Json<EntitlementBody>, ApiError> {
    let now = state.clock.now();
    let record = state
        .admin
        .grant_deep(&actor, &AccountId::new(id), body.to_expiry(), now)?;
    Ok(Json(EntitlementBody { entitlement: record }))
}

/// `POST /admin/accounts/{id}/downgrade` — downgrade to the free tier.
///
/// # Errors
///
/// Returns forbidden for non-superadmin actors and self-targeted downgrades.
pub async fn downgrade(
    State(state): State<AppState>,
    RequireIdentity(actor): RequireIdentity,
    Path(id): Path<String>,
) -> Result<Json<EntitlementBody>, ApiError> {
    let record = state.admin.downgrade(&actor, &AccountId::new(id))?;
    Ok(Json(EntitlementBody { entitlement: record }))
}

/// `POST /admin/accounts/{id}/role` — set the durable role.
///
/// # Errors
///
/// Returns forbidden for non-superadmin actors and self-targeted changes.
pub async fn set_role(
    State(state): State<AppState>,
    RequireIdentity(actor): RequireIdentity,
    Path(id): Path<String>,
    Json(body): Json<RoleBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = AccountId::new(id);
    state.admin.set_role(&actor, &target, body.role)?;
    Ok(Json(serde_json::json!({ "account_id": target, "role": body.role })))
}

/// `POST /admin/accounts/{id}/counters/reset` — reset lifetime counters.
///
/// # Errors
///
/// Returns forbidden for non-superadmin actors.
pub async fn reset_counters(
    State(state): State<AppState>,
    RequireIdentity(actor): RequireIdentity,
    Path(id): Path<String>,
) -> Result<Json<EntitlementBody>, ApiError> {
    let record = state.admin.reset_counters(&actor, &AccountId::new(id))?;
    Ok(Json(EntitlementBody { entitlement: record }))
}

/// `POST /me/upgrade-notice/seen` — acknowledge the one-time upgrade notice.
///
/// # Errors
///
/// Returns unauthenticated without a valid credential.
pub async fn notice_seen(
    State(state): State<AppState>,
    RequireIdentity(claim): RequireIdentity,
) -> Result<Json<EntitlementBody>, ApiError> {
    let record = state.admin.mark_notice_seen(&claim)?;
    Ok(Json(EntitlementBody { entitlement: record }))
}
