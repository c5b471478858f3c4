//! Keycloak Admin API client.
//!
//! All real identity-management logic lives in Keycloak; this module only
//! maps typed calls onto its admin REST endpoints. Admin credentials are
//! exchanged for an access token via the password grant and cached
//! in-process until shortly before expiry.

pub mod admin;
pub mod types;

pub use admin::KeycloakAdmin;
pub use types::{ClientRepresentation, IdentityProviderRepresentation, RealmRepresentation};
