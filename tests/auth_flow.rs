//! Integration tests for the token service and scope gate.
//!
//! These exercise the full issue → verify → authorize chain the HTTP
//! layer composes per request: token round-trips, expiry, tamper
//! detection, and scope subset semantics.

use chrono::Duration;
use unilock::auth::{authorize, TokenService, ADMIN_SCOPE, USER_SCOPE};
use unilock::errors::AppError;

fn service() -> TokenService {
    TokenService::with_secret("integration-test-secret", 15)
}

mod token_lifecycle {
    use super::*;

    /// A token issued for admin@example.com with the admin scope and a
    /// 30-minute lifetime verifies to the same subject and scope set.
    #[test]
    fn test_issue_verify_roundtrip_before_expiry() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::minutes(30)))
            .unwrap();

        let data = svc.verify(&token).unwrap();
        assert_eq!(data.subject, "admin@example.com");
        assert_eq!(data.scopes, vec![ADMIN_SCOPE]);
    }

    #[test]
    fn test_multi_scope_roundtrip() {
        let svc = service();
        let token = svc
            .issue("ops@example.com", &[ADMIN_SCOPE, USER_SCOPE], None)
            .unwrap();

        let data = svc.verify(&token).unwrap();
        assert_eq!(data.scopes, vec![ADMIN_SCOPE, USER_SCOPE]);
    }

    /// Already-expired tokens (ttl of −1 minute) are rejected outright.
    #[test]
    fn test_negative_ttl_fails_verification() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::minutes(-1)))
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_zero_ttl_fails_verification() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::zero()))
            .unwrap();

        assert!(matches!(svc.verify(&token), Err(AppError::InvalidToken)));
    }

    /// Flipping any single byte of the artifact invalidates the signature.
    #[test]
    fn test_tampering_any_segment_is_detected() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::minutes(30)))
            .unwrap();

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            if bytes[i] == b'.' {
                continue; // structural separator, changing it makes a different test
            }
            bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert!(
                matches!(svc.verify(&tampered), Err(AppError::InvalidToken)),
                "tampered byte {} was accepted",
                i
            );
        }
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenService::with_secret("secret-a", 15);
        let verifier = TokenService::with_secret("secret-b", 15);

        let token = issuer
            .issue("admin@example.com", &[ADMIN_SCOPE], None)
            .unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::InvalidToken)));
    }
}

mod scope_gate {
    use super::*;

    /// authorize succeeds iff the required set is a subset of the
    /// token's scopes.
    #[test]
    fn test_subset_semantics() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::minutes(30)))
            .unwrap();
        let data = svc.verify(&token).unwrap();

        assert!(authorize(&data, &[]).is_ok());
        assert!(authorize(&data, &[ADMIN_SCOPE]).is_ok());
        assert!(authorize(&data, &[ADMIN_SCOPE, USER_SCOPE]).is_err());
        assert!(authorize(&data, &[USER_SCOPE]).is_err());
    }

    #[test]
    fn test_missing_scope_is_forbidden_not_unauthorized() {
        let svc = service();
        let token = svc.issue("user@example.com", &[USER_SCOPE], None).unwrap();
        let data = svc.verify(&token).unwrap();

        let err = authorize(&data, &[ADMIN_SCOPE]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden { scope } if scope == ADMIN_SCOPE));
    }

    #[test]
    fn test_scope_names_are_exact_matches() {
        let svc = service();
        let token = svc.issue("user@example.com", &["administrator"], None).unwrap();
        let data = svc.verify(&token).unwrap();

        // "administrator" does not satisfy "admin" — no prefix matching
        assert!(authorize(&data, &[ADMIN_SCOPE]).is_err());
    }
}
