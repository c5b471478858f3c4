//! Wire types for the Keycloak Admin API (camelCase JSON).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealmRepresentation {
    pub realm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_with_email_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_theme: Option<String>,
}

impl RealmRepresentation {
    /// Baseline realm configuration used at domain creation.
    pub fn new_domain(name: &str, display_name: &str) -> Self {
        Self {
            realm: name.to_string(),
            display_name: Some(display_name.to_string()),
            enabled: true,
            registration_allowed: Some(false),
            login_with_email_allowed: Some(true),
            login_theme: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRepresentation {
    /// Internal Keycloak ID (absent on create).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub public_client: bool,
    pub redirect_uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    pub standard_flow_enabled: bool,
    pub implicit_flow_enabled: bool,
    pub direct_access_grants_enabled: bool,
}

impl ClientRepresentation {
    /// Baseline public client used by the dashboard's "new application" flow.
    pub fn new_public(client_id: &str, redirect_uris: Vec<String>) -> Self {
        Self {
            id: None,
            client_id: client_id.to_string(),
            name: None,
            description: None,
            enabled: true,
            public_client: true,
            redirect_uris,
            root_url: None,
            base_url: None,
            admin_url: None,
            standard_flow_enabled: true,
            implicit_flow_enabled: false,
            direct_access_grants_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityProviderRepresentation {
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Provider type, e.g. "google", "github", "saml".
    pub provider_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    pub add_read_token_role_on_create: bool,
    pub trust_email: bool,
    pub store_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_broker_login_flow_alias: Option<String>,
    pub config: serde_json::Map<String, serde_json::Value>,
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realm_serializes_camel_case() {
        let realm = RealmRepresentation::new_domain("acme", "Acme Corp");
        let json = serde_json::to_value(&realm).unwrap();

        assert_eq!(json["realm"], "acme");
        assert_eq!(json["displayName"], "Acme Corp");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["registrationAllowed"], false);
        assert_eq!(json["loginWithEmailAllowed"], true);
        assert!(json.get("loginTheme").is_none());
    }

    #[test]
    fn test_client_deserializes_partial_payload() {
        // Keycloak returns far more fields than we model; unknown ones
        // must be ignored and missing ones defaulted.
        let json = serde_json::json!({
            "id": "abc-123",
            "clientId": "dashboard",
            "enabled": true,
            "publicClient": true,
            "redirectUris": ["https://example.com/*"],
            "webOrigins": ["+"]
        });

        let client: ClientRepresentation = serde_json::from_value(json).unwrap();
        assert_eq!(client.id.as_deref(), Some("abc-123"));
        assert_eq!(client.client_id, "dashboard");
        assert_eq!(client.redirect_uris, vec!["https://example.com/*"]);
        assert!(!client.standard_flow_enabled); // defaulted
    }

    #[test]
    fn test_identity_provider_roundtrip() {
        let json = serde_json::json!({
            "alias": "corp-google",
            "providerId": "google",
            "enabled": true,
            "trustEmail": true,
            "config": {"clientId": "x", "clientSecret": "y"}
        });

        let idp: IdentityProviderRepresentation = serde_json::from_value(json).unwrap();
        assert_eq!(idp.alias, "corp-google");
        assert_eq!(idp.provider_id, "google");
        assert!(idp.trust_email);
        assert_eq!(idp.config["clientId"], "x");

        let back = serde_json::to_value(&idp).unwrap();
        assert_eq!(back["providerId"], "google");
    }
}
