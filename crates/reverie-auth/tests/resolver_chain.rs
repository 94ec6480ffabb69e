// crates/reverie-auth/tests/resolver_chain.rs
// ============================================================================
// Module: Resolver Chain Tests
// Description: Validate ordered credential resolution and cookies.
// Purpose: Ensure the bearer channel wins and failures stay silent.
// Dependencies: reverie-auth, reverie-core
// ============================================================================

//! Session resolver behavior tests over a header-backed carrier stub.

use reverie_auth::CredentialCarrier;
use reverie_auth::SessionCookie;
use reverie_auth::SessionResolver;
use reverie_auth::TokenAuthority;
use reverie_core::AccountId;
use reverie_core::IdentityClaim;
use reverie_core::Role;
use reverie_core::Timestamp;

/// Test result alias keeping assertions terse.
type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Signing secret used across cases.
const SECRET: &[u8] = b"unit-test-signing-secret-at-least-32-bytes";

/// Fixed resolution instant.
const NOW: Timestamp = Timestamp::from_unix_millis(1_754_000_000_000);

/// Plain-string credential carrier for tests.
struct StubCarrier {
    /// Raw authorization header, if present.
    authorization: Option<String>,
    /// Raw cookie header, if present.
    cookie: Option<String>,
}

impl CredentialCarrier for StubCarrier {
    fn authorization_header(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    fn cookie_header(&self) -> Option<&str> {
        self.cookie.as_deref()
    }
}

/// Builds a claim for the given account.
fn claim_for(account: &str) -> IdentityClaim {
    IdentityClaim {
        account_id: AccountId::new(account),
        email: format!("{account}@example.com"),
        display_name: None,
        role: Role::Standard,
    }
}

/// Builds a resolver and a token for each of the two accounts.
fn fixtures() -> Result<(SessionResolver, String, String), Box<dyn std::error::Error>> {
    let authority = TokenAuthority::new(SECRET);
    let header_token = authority.issue(&claim_for("acct-header"), NOW)?;
    let cookie_token = authority.issue(&claim_for("acct-cookie"), NOW)?;
    Ok((SessionResolver::new(authority), header_token, cookie_token))
}

#[test]
fn valid_bearer_wins_over_a_different_identity_cookie() -> TestResult {
    let (resolver, header_token, cookie_token) = fixtures()?;
    let carrier = StubCarrier {
        authorization: Some(format!("Bearer {header_token}")),
        cookie: Some(format!("session_token={cookie_token}")),
    };
    let resolved = resolver.resolve(&carrier, NOW).ok_or("expected an identity")?;
    assert_eq!(resolved.account_id, AccountId::new("acct-header"));
    Ok(())
}

#[test]
fn cookie_alone_resolves() -> TestResult {
    let (resolver, _header_token, cookie_token) = fixtures()?;
    let carrier = StubCarrier {
        authorization: None,
        cookie: Some(format!("theme=dark; session_token={cookie_token}; lang=en")),
    };
    let resolved = resolver.resolve(&carrier, NOW).ok_or("expected an identity")?;
    assert_eq!(resolved.account_id, AccountId::new("acct-cookie"));
    Ok(())
}

#[test]
fn an_invalid_bearer_falls_through_to_the_cookie() -> TestResult {
    let (resolver, _header_token, cookie_token) = fixtures()?;
    let carrier = StubCarrier {
        authorization: Some("Bearer tampered.credential.value".to_string()),
        cookie: Some(format!("session_token={cookie_token}")),
    };
    let resolved = resolver.resolve(&carrier, NOW).ok_or("expected an identity")?;
    assert_eq!(resolved.account_id, AccountId::new("acct-cookie"));
    Ok(())
}

#[test]
fn absence_and_tampering_are_indistinguishable() -> TestResult {
    let (resolver, header_token, _cookie_token) = fixtures()?;

    let empty = StubCarrier { authorization: None, cookie: None };
    assert!(resolver.resolve(&empty, NOW).is_none());

    let tampered = StubCarrier {
        authorization: Some("Bearer not.a.credential".to_string()),
        cookie: Some("session_token=also-not-a-credential".to_string()),
    };
    assert!(resolver.resolve(&tampered, NOW).is_none());

    // A non-bearer scheme is not consulted at all.
    let basic = StubCarrier {
        authorization: Some(format!("Basic {header_token}")),
        cookie: None,
    };
    assert!(resolver.resolve(&basic, NOW).is_none());
    Ok(())
}

#[test]
fn expired_credentials_resolve_to_nothing() -> TestResult {
    let (resolver, header_token, _cookie_token) = fixtures()?;
    let carrier = StubCarrier {
        authorization: Some(format!("Bearer {header_token}")),
        cookie: None,
    };
    let eight_days_later = Timestamp::from_unix_millis(
        NOW.as_unix_millis() + 8 * 24 * 60 * 60 * 1_000,
    );
    assert!(resolver.resolve(&carrier, eight_days_later).is_none());
    Ok(())
}

#[test]
fn session_cookie_attributes_match_the_contract() {
    let production = SessionCookie::new(true);
    let issued = production.issue("credential-value");
    assert_eq!(
        issued,
        "session_token=credential-value; Max-Age=604800; Path=/; HttpOnly; SameSite=Lax; Secure"
    );

    let development = SessionCookie::new(false);
    assert_eq!(
        development.issue("credential-value"),
        "session_token=credential-value; Max-Age=604800; Path=/; HttpOnly; SameSite=Lax"
    );

    assert_eq!(
        production.clear(),
        "session_token=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax; Secure"
    );
}
