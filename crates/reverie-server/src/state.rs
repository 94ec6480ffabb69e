// crates/reverie-server/src/state.rs
// ============================================================================
// Module: Application State
// Description: Shared service handles for the HTTP boundary.
// Purpose: Wire validated configuration into constructed-once services.
// Dependencies: crate::collaborators, reverie-{auth,billing,config,core}
// ============================================================================

//! ## Overview
//! Every service is constructed once from a validated configuration and
//! shared for the process lifetime. Requests are independent short-lived
//! units of work over these handles; nothing here holds per-request state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use reverie_auth::SessionCookie;
use reverie_auth::SessionResolver;
use reverie_auth::TokenAuthority;
use reverie_billing::BillingEventAdapter;
use reverie_billing::WebhookVerifier;
use reverie_config::AuthorityConfig;
use reverie_config::ConfigError;
use reverie_core::AdminService;
use reverie_core::AuthorityStore;
use reverie_core::Clock;
use reverie_core::QuotaEnforcer;
use reverie_core::Timestamp;
use reverie_core::telemetry::AuthorityTelemetry;

use crate::collaborators::AnalysisEngine;
use crate::collaborators::LoginGateway;
use crate::collaborators::ReportBuilder;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Wall-clock implementation for the server edge.
///
/// # Invariants
/// - The only place in the authority that reads host time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Timestamp::from_unix_millis(millis)
    }
}

// ============================================================================
// SECTION: App State
// ============================================================================

/// Shared handles behind the HTTP boundary.
#[derive(Clone)]
pub struct AppState {
    /// Ordered credential resolver; its authority also mints session tokens.
    pub resolver: Arc<SessionResolver>,
    /// Session cookie builder.
    pub cookie: Arc<SessionCookie>,
    /// Quota enforcer.
    pub enforcer: Arc<QuotaEnforcer>,
    /// Administrative operations.
    pub admin: Arc<AdminService>,
    /// Billing event adapter.
    pub adapter: Arc<BillingEventAdapter>,
    /// Webhook signature verifier.
    pub webhook: Arc<WebhookVerifier>,
    /// Admin bootstrap shared secret.
    pub bootstrap_secret: Arc<str>,
    /// Record store.
    pub store: Arc<dyn AuthorityStore>,
    /// Wall-clock seam.
    pub clock: Arc<dyn Clock>,
    /// Login credential collaborator.
    pub login: Arc<dyn LoginGateway>,
    /// Analysis collaborator.
    pub analysis: Arc<dyn AnalysisEngine>,
    /// Report collaborator.
    pub reports: Arc<dyn ReportBuilder>,
}

impl AppState {
    /// Builds the application state from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    #[allow(clippy::too_many_arguments, reason = "One handle per collaborator seam.")]
    pub fn from_config(
        config: &AuthorityConfig,
        store: Arc<dyn AuthorityStore>,
        telemetry: Arc<dyn AuthorityTelemetry>,
        clock: Arc<dyn Clock>,
        login: Arc<dyn LoginGateway>,
        analysis: Arc<dyn AnalysisEngine>,
        reports: Arc<dyn ReportBuilder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let week_offset = config.week_offset()?;
        let resolver = Arc::new(SessionResolver::new(TokenAuthority::with_ttl(
            config.token.secret.as_bytes(),
            config.token_ttl_seconds(),
        )));
        let enforcer = Arc::new(QuotaEnforcer::new(
            store.clone(),
            telemetry.clone(),
            config.quota_limits(),
            week_offset,
        ));
        let admin = Arc::new(AdminService::new(store.clone(), week_offset));
        let adapter = Arc::new(BillingEventAdapter::new(store.clone(), telemetry, week_offset));
        let webhook = Arc::new(WebhookVerifier::new(config.billing.webhook_secret.as_bytes()));
        Ok(Self {
            resolver,
            cookie: Arc::new(SessionCookie::new(config.cookie.secure)),
            enforcer,
            admin,
            adapter,
            webhook,
            bootstrap_secret: Arc::from(config.admin.bootstrap_secret.as_str()),
            store,
            clock,
            login,
            analysis,
            reports,
        })
    }
}
