// crates/reverie-billing/tests/signature_verification.rs
// ============================================================================
// Module: Webhook Signature Tests
// Description: Validate raw-body HMAC verification.
// Purpose: Ensure unauthenticated events are rejected before parsing.
// Dependencies: reverie-billing
// ============================================================================

//! Webhook signature verification behavior tests.

use reverie_billing::WebhookVerifier;

/// Shared webhook secret used across cases.
const SECRET: &[u8] = b"webhook-shared-secret-at-least-32-bytes!";

#[test]
fn a_correctly_signed_body_verifies() {
    let verifier = WebhookVerifier::new(SECRET);
    let body = br#"{"kind":"subscription_canceled","account_id":"acct-1"}"#;
    let signature = verifier.sign(body);
    assert!(verifier.verify(body, &signature));
}

#[test]
fn a_single_bit_flip_in_the_body_rejects() {
    let verifier = WebhookVerifier::new(SECRET);
    let body = br#"{"kind":"subscription_canceled","account_id":"acct-1"}"#;
    let signature = verifier.sign(body);
    let mut altered = body.to_vec();
    altered[0] ^= 0x01;
    assert!(!verifier.verify(&altered, &signature));
}

#[test]
fn a_single_hex_digit_change_in_the_signature_rejects() {
    let verifier = WebhookVerifier::new(SECRET);
    let body = b"payload";
    let signature = verifier.sign(body);
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == '0' { '1' } else { '0' };
    let altered: String = chars.into_iter().collect();
    assert!(!verifier.verify(body, &altered));
}

#[test]
fn malformed_and_truncated_signatures_reject() {
    let verifier = WebhookVerifier::new(SECRET);
    let body = b"payload";
    let signature = verifier.sign(body);
    assert!(!verifier.verify(body, ""));
    assert!(!verifier.verify(body, "not-hex-at-all"));
    assert!(!verifier.verify(body, &signature[..32]));
}

#[test]
fn signatures_from_another_secret_reject() {
    let verifier = WebhookVerifier::new(SECRET);
    let other = WebhookVerifier::new(b"a-different-webhook-secret-32-bytes!!!!!");
    let body = b"payload";
    let signature = other.sign(body);
    assert!(!verifier.verify(body, &signature));
}

#[test]
fn surrounding_whitespace_on_the_header_value_is_tolerated() {
    let verifier = WebhookVerifier::new(SECRET);
    let body = b"payload";
    let signature = verifier.sign(body);
    assert!(verifier.verify(body, &format!("  {signature}\n")));
}
