// crates/reverie-auth/tests/token_roundtrip.rs
// ============================================================================
// Module: Token Round-Trip Tests
// Description: Validate credential minting and silent verification.
// Purpose: Ensure claims survive the round trip and tampering never does.
// Dependencies: reverie-auth, reverie-core, proptest, jsonwebtoken
// ============================================================================

//! Credential verifier behavior tests, including property coverage for the
//! issue/verify round trip.

use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use proptest::option;
use proptest::prelude::ProptestConfig;
use proptest::prop_assert_eq;
use proptest::proptest;
use reverie_auth::TOKEN_TTL_SECONDS;
use reverie_auth::TokenAuthority;
use reverie_core::AccountId;
use reverie_core::IdentityClaim;
use reverie_core::Role;
use reverie_core::Timestamp;
use serde::Serialize;

/// Test result alias keeping assertions terse.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Signing secret used across cases.
const SECRET: &[u8] = b"unit-test-signing-secret-at-least-32-bytes";

/// Fixed issuance instant.
const NOW: Timestamp = Timestamp::from_unix_millis(1_754_000_000_000);

/// Builds a standard-tier claim.
fn claim() -> IdentityClaim {
    IdentityClaim {
        account_id: AccountId::new("acct-7"),
        email: "dreamer@example.com".to_string(),
        display_name: Some("Dreamer".to_string()),
        role: Role::Standard,
    }
}

#[test]
fn issued_credentials_verify_to_the_same_claim() -> TestResult {
    let authority = TokenAuthority::new(SECRET);
    let token = authority.issue(&claim(), NOW)?;
    let verified = authority.verify(&token, NOW).ok_or("expected valid credential")?;
    assert_eq!(verified, claim());
    Ok(())
}

#[test]
fn a_single_altered_signature_character_fails_verification() -> TestResult {
    let authority = TokenAuthority::new(SECRET);
    let token = authority.issue(&claim(), NOW)?;
    let dot = token.rfind('.').ok_or("token missing signature separator")?;
    let signature_start = dot + 1;
    let flipped: String = token
        .char_indices()
        .map(|(index, ch)| {
            if index == signature_start {
                if ch == 'A' { 'B' } else { 'A' }
            } else {
                ch
            }
        })
        .collect();
    assert_ne!(flipped, token);
    assert!(authority.verify(&flipped, NOW).is_none());
    Ok(())
}

#[test]
fn a_correctly_signed_but_expired_credential_fails_verification() -> TestResult {
    let authority = TokenAuthority::new(SECRET);
    let token = authority.issue(&claim(), NOW)?;

    let just_before_expiry = Timestamp::from_unix_millis(
        NOW.as_unix_millis() + (TOKEN_TTL_SECONDS - 1) * 1_000,
    );
    assert!(authority.verify(&token, just_before_expiry).is_some());

    let at_expiry =
        Timestamp::from_unix_millis(NOW.as_unix_millis() + TOKEN_TTL_SECONDS * 1_000);
    assert!(authority.verify(&token, at_expiry).is_none());
    Ok(())
}

#[test]
fn tokens_signed_with_another_secret_fail_verification() -> TestResult {
    let authority = TokenAuthority::new(SECRET);
    let other = TokenAuthority::new(b"a-completely-different-signing-secret!!");
    let token = other.issue(&claim(), NOW)?;
    assert!(authority.verify(&token, NOW).is_none());
    Ok(())
}

/// Payload mirroring the wire claims for algorithm-confusion tests.
#[derive(Serialize)]
struct ForgedClaims {
    /// Subject field.
    sub: String,
    /// Email field.
    email: String,
    /// Role field.
    role: Role,
    /// Issued-at field.
    iat: i64,
    /// Expiry field.
    exp: i64,
}

#[test]
fn tokens_using_any_other_algorithm_are_rejected() -> TestResult {
    let authority = TokenAuthority::new(SECRET);
    let forged = ForgedClaims {
        sub: "acct-7".to_string(),
        email: "dreamer@example.com".to_string(),
        role: Role::Superadmin,
        iat: NOW.as_unix_millis() / 1_000,
        exp: NOW.as_unix_millis() / 1_000 + TOKEN_TTL_SECONDS,
    };
    // Same secret, different HMAC variant: still rejected.
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS384),
        &forged,
        &EncodingKey::from_secret(SECRET),
    )?;
    assert!(authority.verify(&token, NOW).is_none());
    Ok(())
}

#[test]
fn garbage_input_fails_silently() {
    let authority = TokenAuthority::new(SECRET);
    assert!(authority.verify("", NOW).is_none());
    assert!(authority.verify("not-a-token", NOW).is_none());
    assert!(authority.verify("a.b.c", NOW).is_none());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every claim shape survives the issue/verify round trip unchanged.
    #[test]
    fn round_trip_preserves_all_claim_fields(
        account in "[a-z0-9-]{1,24}",
        local in "[a-z0-9.]{1,16}",
        name in option::of("[A-Za-z ]{1,24}"),
        superadmin in proptest::bool::ANY,
    ) {
        let claim = IdentityClaim {
            account_id: AccountId::new(account),
            email: format!("{local}@example.com"),
            display_name: name,
            role: if superadmin { Role::Superadmin } else { Role::Standard },
        };
        let authority = TokenAuthority::new(SECRET);
        let token = authority
            .issue(&claim, NOW)
            .map_err(|error| proptest::test_runner::TestCaseError::fail(error.to_string()))?;
        let verified = authority.verify(&token, NOW);
        prop_assert_eq!(verified, Some(claim));
    }
}
