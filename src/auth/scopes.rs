use crate::errors::AppError;

use super::token::TokenData;

/// Scope granting access to all management operations.
pub const ADMIN_SCOPE: &str = "admin";
/// Scope granting regular user operations.
pub const USER_SCOPE: &str = "user";

/// Check a verified token against a required scope set.
///
/// Every required scope must be present in the token (logical AND); an
/// empty requirement always passes. Plain set membership; scopes carry
/// no ordering or precedence.
pub fn authorize<'a>(
    token: &'a TokenData,
    required_scopes: &[&str],
) -> Result<&'a TokenData, AppError> {
    for scope in required_scopes {
        if !token.scopes.iter().any(|s| s == scope) {
            tracing::warn!(
                subject = %token.subject,
                scope = scope,
                "access denied: missing required scope"
            );
            return Err(AppError::Forbidden {
                scope: scope.to_string(),
            });
        }
    }
    Ok(token)
}

/// Canned policy: the token must carry the `admin` scope.
pub fn admin_required(token: &TokenData) -> Result<&TokenData, AppError> {
    authorize(token, &[ADMIN_SCOPE])
}

/// Canned policy: the token must carry the `user` scope.
pub fn user_required(token: &TokenData) -> Result<&TokenData, AppError> {
    authorize(token, &[USER_SCOPE])
}

// ── Tests ────────────────────────────────────────────────────
