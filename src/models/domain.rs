use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::keycloak::RealmRepresentation;
use crate::store::postgres::DomainRow;

/// Realm names become URL path segments and Keycloak identifiers:
/// lowercase, digits, hyphens only.
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

#[derive(Debug, Deserialize)]
pub struct DomainCreate {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub default_client_redirect: Option<String>,
}

impl DomainCreate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.len() < 3 || self.name.len() > 255 {
            return Err(AppError::Validation(
                "name must be between 3 and 255 characters".into(),
            ));
        }
        if !NAME_RE.is_match(&self.name) {
            return Err(AppError::Validation(
                "name may only contain lowercase letters, numbers and hyphens".into(),
            ));
        }
        if self.display_name.len() < 3 || self.display_name.len() > 255 {
            return Err(AppError::Validation(
                "display_name must be between 3 and 255 characters".into(),
            ));
        }
        if let Some(desc) = &self.description {
            if desc.len() > 500 {
                return Err(AppError::Validation(
                    "description must be at most 500 characters".into(),
                ));
            }
        }
        if let Some(redirect) = &self.default_client_redirect {
            if redirect.len() > 500 {
                return Err(AppError::Validation(
                    "default_client_redirect must be at most 500 characters".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainUpdateRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub default_client_redirect: Option<String>,
}

/// Domain detail: the local row, plus live realm info when the provider
/// call succeeded.
#[derive(Debug, Serialize)]
pub struct DomainDetail {
    #[serde(flatten)]
    pub domain: DomainRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keycloak_info: Option<RealmRepresentation>,
}

// ── Tests ────────────────────────────────────────────────────
