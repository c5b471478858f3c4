//! Identity-provider (federation) management — pass-through to the
//! realm's identity-provider instances.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::keycloak::IdentityProviderRepresentation;
use crate::AppState;

#[derive(Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<IdentityProviderRepresentation>,
}

/// Update payload: the only mutable field exposed is the enabled state.
#[derive(Deserialize)]
pub struct ProviderUpdateRequest {
    pub enabled: bool,
}

async fn require_domain(state: &AppState, name: &str) -> Result<(), AppError> {
    if !state.db.domain_exists(name).await? {
        return Err(AppError::DomainNotFound(name.to_string()));
    }
    Ok(())
}

/// GET /api/v1/domains/:name/identity-providers
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ProviderListResponse>, AppError> {
    require_domain(&state, &name).await?;

    let providers = state.keycloak.list_identity_providers(&name).await?;
    Ok(Json(ProviderListResponse { providers }))
}

/// POST /api/v1/domains/:name/identity-providers
pub async fn create_provider(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<IdentityProviderRepresentation>,
) -> Result<(StatusCode, Json<IdentityProviderRepresentation>), AppError> {
    require_domain(&state, &name).await?;

    if payload.alias.is_empty() {
        return Err(AppError::Validation("alias must not be empty".into()));
    }
    if payload.provider_id.is_empty() {
        return Err(AppError::Validation("providerId must not be empty".into()));
    }

    state.keycloak.create_identity_provider(&name, &payload).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// GET /api/v1/domains/:name/identity-providers/:alias
pub async fn get_provider(
    State(state): State<Arc<AppState>>,
    Path((name, alias)): Path<(String, String)>,
) -> Result<Json<IdentityProviderRepresentation>, AppError> {
    require_domain(&state, &name).await?;

    let provider = state.keycloak.get_identity_provider(&name, &alias).await?;
    Ok(Json(provider))
}

/// PUT /api/v1/domains/:name/identity-providers/:alias — toggle enabled.
pub async fn update_provider(
    State(state): State<Arc<AppState>>,
    Path((name, alias)): Path<(String, String)>,
    Json(payload): Json<ProviderUpdateRequest>,
) -> Result<Json<IdentityProviderRepresentation>, AppError> {
    require_domain(&state, &name).await?;

    // Full representation required by the admin API: fetch, flip, put back
    let mut provider = state.keycloak.get_identity_provider(&name, &alias).await?;
    provider.enabled = payload.enabled;
    state
        .keycloak
        .update_identity_provider(&name, &alias, &provider)
        .await?;

    Ok(Json(provider))
}
