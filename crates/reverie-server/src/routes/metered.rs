// crates/reverie-server/src/routes/metered.rs
// ============================================================================
// Module: Metered Routes
// Description: Analysis and report endpoints gated by the quota enforcer.
// Purpose: Run the decide, work, commit, redact flow for metered actions.
// Dependencies: axum, crate::{collaborators, error, extract, state}, reverie-core
// ============================================================================

//! ## Overview
//! Each metered route follows the same shape: authorize first, run the
//! collaborator, commit only after success, then redact for the caller's
//! tier. A collaborator failure returns 502 and never consumes quota. A
//! commit that loses a same-account race returns the quota rejection and the
//! produced result is discarded, never delivered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::extract::State;
use reverie_core::ActionKind;
use reverie_core::AnalysisOutcome;
use reverie_core::AuthorityError;
use reverie_core::QuotaDecision;
use serde::Deserialize;
use serde::Serialize;

use crate::collaborators::WeeklyReport;
use crate::error::ApiError;
use crate::error::denial_to_error;
use crate::extract::RequireIdentity;
use crate::state::AppState;

// ============================================================================
// SECTION: Bodies
// ============================================================================

/// Analysis request body.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// Journal entry text to analyze.
    pub entry_text: String,
}

/// Analysis response body.
#[derive(Debug, Serialize)]
pub struct AnalysisBody {
    /// Analysis outcome, redacted per the caller's tier.
    pub analysis: AnalysisOutcome,
}

/// Report response body.
#[derive(Debug, Serialize)]
pub struct ReportBody {
    /// The produced weekly report.
    pub report: WeeklyReport,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// `POST /analysis` — run a single-entry analysis.
///
/// # Errors
///
/// Returns the quota rejection when the lifetime cap is exhausted, 502 when
/// the analysis collaborator fails, and unauthenticated without a valid
/// credential.
pub async fn run_analysis(
    State(state): State<AppState>,
    RequireIdentity(claim): RequireIdentity,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisBody>, ApiError> {
    let now = state.clock.now();
    let decision = state.enforcer.authorize(&claim, ActionKind::SingleAnalysis, now)?;
    let consumes_quota = match decision {
        QuotaDecision::Allowed { consumes_quota } => consumes_quota,
        QuotaDecision::Denied { reason, message } => return Err(denial_to_error(reason, message)),
    };

    let outcome = state.analysis.analyze(&request.entry_text).map_err(|error| {
        ApiError::from(AuthorityError::ExternalServiceUnavailable(error.to_string()))
    })?;

    // Consume only after the metered work succeeded. Losing the commit race
    // means the result is discarded, not delivered over-quota.
    if consumes_quota {
        state.enforcer.commit_analysis(&claim.account_id)?;
    }

    let premium = state.enforcer.is_premium(&claim, now)?;
    Ok(Json(AnalysisBody { analysis: outcome.redacted_for_plan(premium) }))
}

/// `POST /reports` — generate the weekly report.
///
/// # Errors
///
/// Returns the quota rejection when the applicable cap is exhausted, the
/// precondition rejection when too few days are recorded, 502 when the
/// report collaborator fails, and unauthenticated without a valid
/// credential.
pub async fn generate_report(
    State(state): State<AppState>,
    RequireIdentity(claim): RequireIdentity,
) -> Result<Json<ReportBody>, ApiError> {
    let now = state.clock.now();
    let decision = state.enforcer.authorize(&claim, ActionKind::WeeklyReport, now)?;
    if let QuotaDecision::Denied { reason, message } = decision {
        return Err(denial_to_error(reason, message));
    }

    let report = state.reports.build(&claim.account_id).map_err(|error| {
        ApiError::from(AuthorityError::ExternalServiceUnavailable(error.to_string()))
    })?;

    // Persist the report and consume free-tier quota in one guarded commit.
    state.enforcer.commit_report(&claim, now)?;

    Ok(Json(ReportBody { report }))
}
