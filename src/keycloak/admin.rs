use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::errors::AppError;

use super::types::{ClientRepresentation, IdentityProviderRepresentation, RealmRepresentation};

/// Admin access token obtained via the password grant.
struct CachedAdminToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Refresh the cached admin token this many seconds before it expires.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 10;

/// Typed client for the Keycloak Admin REST API.
///
/// Holds the only piece of shared mutable state in the process: the cached
/// admin access token, refreshed on expiry behind an `RwLock`.
pub struct KeycloakAdmin {
    base_url: String,
    admin_realm: String,
    username: String,
    password: String,
    client: ClientWithMiddleware,
    token: RwLock<Option<CachedAdminToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

impl KeycloakAdmin {
    pub fn new(config: &Config) -> Self {
        Self::with_credentials(
            &config.keycloak_url,
            &config.keycloak_realm,
            &config.keycloak_admin_username,
            &config.keycloak_admin_password,
        )
    }

    pub fn with_credentials(base_url: &str, admin_realm: &str, username: &str, password: &str) -> Self {
        let reqwest_client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");

        // Transient failures against the admin API get exponential backoff
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest_client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_realm: admin_realm.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            client,
            token: RwLock::new(None),
        }
    }

    // ── Admin token ──────────────────────────────────────────

    /// Return a valid admin access token, logging in when the cached one
    /// is missing or about to expire.
    async fn admin_token(&self) -> Result<String, AppError> {
        {
            let guard = self.token.read().await;
            if let Some(tok) = guard.as_ref() {
                if Utc::now() < tok.expires_at {
                    return Ok(tok.access_token.clone());
                }
            }
        }

        let mut guard = self.token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(tok) = guard.as_ref() {
            if Utc::now() < tok.expires_at {
                return Ok(tok.access_token.clone());
            }
        }

        let url = format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url,
            urlencoding::encode(&self.admin_realm)
        );
        let params = [
            ("grant_type", "password"),
            ("client_id", "admin-cli"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];

        let resp = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Keycloak admin login failed after retries: {}", e);
                AppError::Upstream(e.to_string())
            })?;

        if !resp.status().is_success() {
            tracing::error!("Keycloak admin login rejected with status {}", resp.status());
            return Err(AppError::Upstream(format!(
                "admin login rejected with status {}",
                resp.status()
            )));
        }

        let tok: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed token response: {}", e)))?;

        let ttl = (tok.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0);
        *guard = Some(CachedAdminToken {
            access_token: tok.access_token.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(ttl),
        });
        tracing::info!("Obtained Keycloak admin token (expires in {}s)", tok.expires_in);

        Ok(tok.access_token)
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/admin{}", self.base_url, path)
    }

    /// Pull the human-readable error detail out of a Keycloak error body.
    async fn detail(resp: reqwest::Response) -> String {
        let status = resp.status();
        match resp.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("errorMessage")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("status {}", status)),
            Err(_) => format!("status {}", status),
        }
    }

    /// Map a non-success realm-scoped response to the error taxonomy.
    async fn realm_error(resp: reqwest::Response, realm: &str) -> AppError {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return AppError::RealmNotFound(realm.to_string());
        }
        if status.is_client_error() {
            return AppError::Provider(Self::detail(resp).await);
        }
        AppError::Upstream(format!("keycloak returned {}", status))
    }

    // ── Realms ───────────────────────────────────────────────

    pub async fn create_realm(&self, name: &str, display_name: &str) -> Result<(), AppError> {
        let token = self.admin_token().await?;
        let body = RealmRepresentation::new_domain(name, display_name);

        let resp = self
            .client
            .post(self.admin_url("/realms"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let err = Self::realm_error(resp, name).await;
            tracing::error!("Failed to create realm {}: {}", name, err);
            return Err(err);
        }

        tracing::info!("Created new realm: {}", name);
        Ok(())
    }

    pub async fn get_realm(&self, realm: &str) -> Result<RealmRepresentation, AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .get(self.admin_url(&format!("/realms/{}", urlencoding::encode(realm))))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed realm payload: {}", e)))
    }

    pub async fn update_realm(&self, realm: &str, attrs: &RealmRepresentation) -> Result<(), AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .put(self.admin_url(&format!("/realms/{}", urlencoding::encode(realm))))
            .bearer_auth(token)
            .json(attrs)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let err = Self::realm_error(resp, realm).await;
            tracing::error!("Failed to update realm {}: {}", realm, err);
            return Err(err);
        }

        Ok(())
    }

    // ── Clients ──────────────────────────────────────────────

    pub async fn list_clients(&self, realm: &str) -> Result<Vec<ClientRepresentation>, AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .get(self.admin_url(&format!("/realms/{}/clients", urlencoding::encode(realm))))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed client list: {}", e)))
    }

    pub async fn create_client(
        &self,
        realm: &str,
        client: &ClientRepresentation,
    ) -> Result<(), AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .post(self.admin_url(&format!("/realms/{}/clients", urlencoding::encode(realm))))
            .bearer_auth(token)
            .json(client)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let err = Self::realm_error(resp, realm).await;
            tracing::error!("Failed to create client {} in realm {}: {}", client.client_id, realm, err);
            return Err(err);
        }

        tracing::info!("Created client {} in realm {}", client.client_id, realm);
        Ok(())
    }

    pub async fn get_client(&self, realm: &str, id: &str) -> Result<ClientRepresentation, AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .get(self.admin_url(&format!(
                "/realms/{}/clients/{}",
                urlencoding::encode(realm),
                urlencoding::encode(id)
            )))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Provider(format!("client {} not found", id)));
        }
        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed client payload: {}", e)))
    }

    pub async fn delete_client(&self, realm: &str, id: &str) -> Result<(), AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .delete(self.admin_url(&format!(
                "/realms/{}/clients/{}",
                urlencoding::encode(realm),
                urlencoding::encode(id)
            )))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Provider(format!("client {} not found", id)));
        }
        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        tracing::info!("Deleted client {} from realm {}", id, realm);
        Ok(())
    }

    /// The admin API has no partial update for clients: fetch the full
    /// representation, flip the flag, and put it back.
    pub async fn set_client_enabled(
        &self,
        realm: &str,
        id: &str,
        enabled: bool,
    ) -> Result<ClientRepresentation, AppError> {
        let mut client = self.get_client(realm, id).await?;
        client.enabled = enabled;

        let token = self.admin_token().await?;
        let resp = self
            .client
            .put(self.admin_url(&format!(
                "/realms/{}/clients/{}",
                urlencoding::encode(realm),
                urlencoding::encode(id)
            )))
            .bearer_auth(token)
            .json(&client)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        Ok(client)
    }

    // ── Identity providers ───────────────────────────────────

    pub async fn list_identity_providers(
        &self,
        realm: &str,
    ) -> Result<Vec<IdentityProviderRepresentation>, AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .get(self.admin_url(&format!(
                "/realms/{}/identity-provider/instances",
                urlencoding::encode(realm)
            )))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed identity-provider list: {}", e)))
    }

    pub async fn get_identity_provider(
        &self,
        realm: &str,
        alias: &str,
    ) -> Result<IdentityProviderRepresentation, AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .get(self.admin_url(&format!(
                "/realms/{}/identity-provider/instances/{}",
                urlencoding::encode(realm),
                urlencoding::encode(alias)
            )))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Provider(format!("identity provider {} not found", alias)));
        }
        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        resp.json()
            .await
            .map_err(|e| AppError::Upstream(format!("malformed identity-provider payload: {}", e)))
    }

    pub async fn create_identity_provider(
        &self,
        realm: &str,
        provider: &IdentityProviderRepresentation,
    ) -> Result<(), AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .post(self.admin_url(&format!(
                "/realms/{}/identity-provider/instances",
                urlencoding::encode(realm)
            )))
            .bearer_auth(token)
            .json(provider)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let err = Self::realm_error(resp, realm).await;
            tracing::error!(
                "Failed to create identity provider {} in realm {}: {}",
                provider.alias,
                realm,
                err
            );
            return Err(err);
        }

        tracing::info!("Created identity provider {} in realm {}", provider.alias, realm);
        Ok(())
    }

    pub async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        provider: &IdentityProviderRepresentation,
    ) -> Result<(), AppError> {
        let token = self.admin_token().await?;

        let resp = self
            .client
            .put(self.admin_url(&format!(
                "/realms/{}/identity-provider/instances/{}",
                urlencoding::encode(realm),
                urlencoding::encode(alias)
            )))
            .bearer_auth(token)
            .json(provider)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::Provider(format!("identity provider {} not found", alias)));
        }
        if !resp.status().is_success() {
            return Err(Self::realm_error(resp, realm).await);
        }

        Ok(())
    }
}
