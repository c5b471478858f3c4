//! JWT authentication and scope-based authorization.
//!
//! Two pieces:
//! - [`token::TokenService`] issues and verifies HS256 access tokens
//!   (subject + scopes + expiry, signed with the process-wide secret).
//! - [`scopes::authorize`] gates a verified token against a required
//!   scope set. Composed explicitly by the HTTP layer in `api`.
//!
//! Tokens are stateless: there is no revocation list and no refresh.
//! A token's scopes are fixed at issuance for its full lifetime.

pub mod scopes;
pub mod token;

pub use scopes::{admin_required, authorize, user_required, ADMIN_SCOPE, USER_SCOPE};
pub use token::{TokenData, TokenService};
