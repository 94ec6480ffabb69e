// crates/reverie-server/src/lib.rs
// ============================================================================
// Module: Reverie Server
// Description: HTTP boundary for the entitlement and session authority.
// Purpose: Expose the authority over axum with identity extraction.
// Dependencies: axum, reverie-{auth,billing,config,core}, serde, subtle, tokio
// ============================================================================

//! ## Overview
//! `reverie-server` wires the authority services into an axum router:
//! session issuance, identity extraction over the two credential channels,
//! the admin bootstrap secret channel, the billing webhook, metered
//! analysis/report routes, and administrative account operations. The rest
//! of the journaling application mounts this router alongside its own.

/// External collaborator seams.
pub mod collaborators;
/// HTTP error mapping.
pub mod error;
/// Identity extractors.
pub mod extract;
/// Route handlers.
pub mod routes;
/// Constant-time secret comparison.
pub mod security;
/// Shared application state.
pub mod state;

use axum::Router;
use axum::routing::post;

pub use crate::collaborators::AnalysisEngine;
pub use crate::collaborators::CollaboratorError;
pub use crate::collaborators::LoginError;
pub use crate::collaborators::LoginGateway;
pub use crate::collaborators::LoginRequest;
pub use crate::collaborators::ReportBuilder;
pub use crate::collaborators::WeeklyReport;
pub use crate::error::ApiError;
pub use crate::error::ErrorBody;
pub use crate::extract::MaybeIdentity;
pub use crate::extract::RequireIdentity;
pub use crate::state::AppState;
pub use crate::state::SystemClock;

/// Builds the authority router over the shared state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", post(routes::session::login))
        .route("/session/logout", post(routes::session::logout))
        .route("/analysis", post(routes::metered::run_analysis))
        .route("/reports", post(routes::metered::generate_report))
        .route("/me/upgrade-notice/seen", post(routes::admin::notice_seen))
        .route("/admin/bootstrap", post(routes::admin::bootstrap))
        .route("/admin/accounts/{id}/plan", post(routes::admin::grant_plan))
        .route("/admin/accounts/{id}/downgrade", post(routes::admin::downgrade))
        .route("/admin/accounts/{id}/role", post(routes::admin::set_role))
        .route("/admin/accounts/{id}/counters/reset", post(routes::admin::reset_counters))
        .route("/billing/webhook", post(routes::billing::webhook))
        .with_state(state)
}

/// Serves the router on the given address until the process exits.
///
/// # Errors
///
/// Returns [`std::io::Error`] when binding or serving fails.
pub async fn serve(addr: std::net::SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}
