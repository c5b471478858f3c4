use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;

/// Signed claims carried inside an access token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user identifier)
    sub: String,
    /// Granted permission scopes
    #[serde(default)]
    scopes: Vec<String>,
    /// Expiration (Unix timestamp)
    exp: i64,
}

/// Verified identity extracted from a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub subject: String,
    pub scopes: Vec<String>,
}

/// Issues and verifies HS256 access tokens.
///
/// Keys are derived once from the configured secret; the service holds no
/// other state, so verification is pure computation and safe under
/// arbitrary concurrency.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        Self::with_secret(&config.secret_key, config.access_token_ttl_minutes)
    }

    pub fn with_secret(secret: &str, default_ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expired means expired: a token issued with ttl <= 0 must fail
        // verification immediately.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl: Duration::minutes(default_ttl_minutes),
        }
    }

    /// Issue a signed token for `subject` carrying `scopes`, expiring at
    /// `now + ttl` (the configured default when `ttl` is `None`).
    pub fn issue(
        &self,
        subject: &str,
        scopes: &[&str],
        ttl: Option<Duration>,
    ) -> Result<String, AppError> {
        let expire = Utc::now() + ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: subject.to_string(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            exp: expire.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {}", e)))
    }

    /// Verify signature and expiry, and decode subject + scopes.
    ///
    /// Signature mismatch, malformed payload, missing subject, and past
    /// expiry all collapse to `InvalidToken`. One-shot and stateless;
    /// there is nothing to retry.
    pub fn verify(&self, token: &str) -> Result<TokenData, AppError> {
        let decoded = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("token verification failed: {}", e);
                AppError::InvalidToken
            })?;

        if decoded.claims.sub.is_empty() {
            return Err(AppError::InvalidToken);
        }

        // `exp` marks the first instant the token is no longer valid
        // (RFC 7519 §4.1.4); the decoder alone lets `exp == now` through.
        if decoded.claims.exp <= Utc::now().timestamp() {
            return Err(AppError::InvalidToken);
        }

        Ok(TokenData {
            subject: decoded.claims.sub,
            scopes: decoded.claims.scopes,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::with_secret("unit-test-secret", 15)
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &["admin"], Some(Duration::minutes(30)))
            .unwrap();

        let data = svc.verify(&token).unwrap();
        assert_eq!(data.subject, "admin@example.com");
        assert_eq!(data.scopes, vec!["admin"]);
    }

    #[test]
    fn test_default_ttl_applies() {
        let svc = service();
        let token = svc.issue("user@example.com", &["user"], None).unwrap();
        assert!(svc.verify(&token).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let token = svc
            .issue("late@example.com", &["user"], Some(Duration::minutes(-1)))
            .unwrap();

        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let svc = service();
        let token = svc
            .issue("now@example.com", &[], Some(Duration::seconds(0)))
            .unwrap();
        assert!(matches!(svc.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc
            .issue("admin@example.com", &["admin"], Some(Duration::minutes(30)))
            .unwrap();

        // Flip one character of the payload segment
        let mut bytes = token.into_bytes();
        let dot = bytes.iter().position(|&b| b == b'.').unwrap();
        bytes[dot + 1] = if bytes[dot + 1] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(svc.verify(&tampered), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = TokenService::with_secret("a-different-secret", 15);
        let token = svc.issue("admin@example.com", &["admin"], None).unwrap();

        assert!(matches!(other.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_garbage_rejected() {
        let svc = service();
        assert!(matches!(svc.verify("not-a-jwt"), Err(AppError::InvalidToken)));
        assert!(matches!(svc.verify(""), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_empty_scope_set_roundtrip() {
        let svc = service();
        let token = svc.issue("nobody@example.com", &[], None).unwrap();
        let data = svc.verify(&token).unwrap();
        assert!(data.scopes.is_empty());
    }
}
