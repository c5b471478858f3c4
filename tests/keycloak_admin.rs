//! Integration tests for the Keycloak admin client, against a wiremock
//! stand-in for the admin REST API.
//!
//! Covers the password-grant login (and its caching), the realm/client/
//! identity-provider operations, and the mapping of provider-side
//! failures onto the error taxonomy.

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unilock::errors::AppError;
use unilock::keycloak::{IdentityProviderRepresentation, KeycloakAdmin};

async fn mock_admin_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token",
            "expires_in": 60,
        })))
        .mount(server)
        .await;
}

fn admin_for(server: &MockServer) -> KeycloakAdmin {
    KeycloakAdmin::with_credentials(&server.uri(), "master", "admin", "admin")
}

#[tokio::test]
async fn test_create_realm_posts_representation() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/admin/realms"))
        .and(body_string_contains("\"realm\":\"acme\""))
        .and(body_string_contains("\"displayName\":\"Acme Corp\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    kc.create_realm("acme", "Acme Corp").await.unwrap();
}

#[tokio::test]
async fn test_admin_token_is_cached_across_calls() {
    let server = MockServer::start().await;

    // The login endpoint must be hit exactly once for two admin calls
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "admin-token",
            "expires_in": 300,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "realm": "acme",
            "displayName": "Acme Corp",
            "enabled": true,
        })))
        .expect(2)
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    kc.get_realm("acme").await.unwrap();
    kc.get_realm("acme").await.unwrap();
}

#[tokio::test]
async fn test_get_realm_maps_missing_to_not_found() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let err = kc.get_realm("ghost").await.unwrap_err();
    assert!(matches!(err, AppError::RealmNotFound(name) if name == "ghost"));
}

#[tokio::test]
async fn test_create_realm_conflict_maps_to_provider_error() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/admin/realms"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errorMessage": "Conflict detected. See logs for details",
        })))
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let err = kc.create_realm("acme", "Acme Corp").await.unwrap_err();
    match err {
        AppError::Provider(msg) => assert!(msg.contains("Conflict")),
        other => panic!("expected Provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_admin_login_maps_to_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
        })))
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let err = kc.get_realm("acme").await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
}

#[tokio::test]
async fn test_list_clients_deserializes_partial_payloads() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "uuid-1",
                "clientId": "dashboard",
                "enabled": true,
                "publicClient": true,
                "redirectUris": ["https://acme.example.com/*"],
                "surrogateAuthRequired": false
            },
            {
                "id": "uuid-2",
                "clientId": "service-account",
                "enabled": false,
                "publicClient": false,
                "redirectUris": []
            }
        ])))
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let clients = kc.list_clients("acme").await.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].client_id, "dashboard");
    assert!(!clients[1].enabled);
}

#[tokio::test]
async fn test_set_client_enabled_fetches_then_puts() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/clients/uuid-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "uuid-1",
            "clientId": "dashboard",
            "enabled": true,
            "publicClient": true,
            "redirectUris": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/realms/acme/clients/uuid-1"))
        .and(body_string_contains("\"enabled\":false"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let client = kc.set_client_enabled("acme", "uuid-1", false).await.unwrap();
    assert!(!client.enabled);
}

#[tokio::test]
async fn test_identity_provider_listing_and_update() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/identity-provider/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "alias": "corp-google",
                "providerId": "google",
                "enabled": true,
                "trustEmail": true,
                "config": {"clientId": "gid"}
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/identity-provider/instances/corp-google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alias": "corp-google",
            "providerId": "google",
            "enabled": true,
            "config": {}
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/realms/acme/identity-provider/instances/corp-google"))
        .and(body_string_contains("\"enabled\":false"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let kc = admin_for(&server);

    let providers = kc.list_identity_providers("acme").await.unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].alias, "corp-google");

    let mut provider: IdentityProviderRepresentation =
        kc.get_identity_provider("acme", "corp-google").await.unwrap();
    provider.enabled = false;
    kc.update_identity_provider("acme", "corp-google", &provider)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_missing_identity_provider_is_provider_error() {
    let server = MockServer::start().await;
    mock_admin_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/identity-provider/instances/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let kc = admin_for(&server);
    let err = kc.get_identity_provider("acme", "ghost").await.unwrap_err();
    assert!(matches!(err, AppError::Provider(msg) if msg.contains("ghost")));
}
