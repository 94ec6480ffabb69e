// crates/reverie-billing/src/lib.rs
// ============================================================================
// Module: Reverie Billing
// Description: Billing webhook boundary for the entitlement authority.
// Purpose: Authenticate provider events and apply plan transitions.
// Dependencies: hex, hmac, reverie-core, serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! `reverie-billing` is the external-collaborator boundary for the payment
//! provider: raw-body signature verification, the closed billing event
//! model, and the adapter translating events into entitlement transitions.
//! The provider's hosted checkout itself is out of scope; only its webhook
//! assertions reach this crate.

/// Event-to-transition adapter.
pub mod adapter;
/// Provider event model and parsing.
pub mod event;
/// Raw-body signature verification.
pub mod signature;

pub use crate::adapter::BillingEventAdapter;
pub use crate::adapter::BillingOutcome;
pub use crate::event::BillingError;
pub use crate::event::BillingEvent;
pub use crate::event::BillingEventKind;
pub use crate::event::BillingPeriod;
pub use crate::event::ProviderStatus;
pub use crate::signature::WebhookVerifier;
