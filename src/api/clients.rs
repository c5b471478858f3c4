//! Client (application) management — straight pass-through to the realm's
//! client collection, with redirect-URI defaulting from the domain record.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::keycloak::ClientRepresentation;
use crate::store::postgres::DomainRow;
use crate::AppState;

#[derive(Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientRepresentation>,
}

/// Dashboard payload for creating an application. camelCase to match the
/// Keycloak representation it feeds into.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub client_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
pub struct ClientStateRequest {
    pub enabled: bool,
}

async fn require_domain(state: &AppState, name: &str) -> Result<DomainRow, AppError> {
    state
        .db
        .get_domain(name)
        .await?
        .ok_or_else(|| AppError::DomainNotFound(name.to_string()))
}

/// GET /api/v1/domains/:name/clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ClientListResponse>, AppError> {
    require_domain(&state, &name).await?;

    let clients = state.keycloak.list_clients(&name).await?;
    Ok(Json(ClientListResponse { clients }))
}

/// POST /api/v1/domains/:name/clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientRepresentation>), AppError> {
    let domain = require_domain(&state, &name).await?;

    if payload.client_id.is_empty() {
        return Err(AppError::Validation("clientId must not be empty".into()));
    }

    // Fall back to the domain's default redirect when the caller gave none
    let redirect_uris = if payload.redirect_uris.is_empty() {
        domain
            .default_client_redirect
            .map(|uri| vec![uri])
            .unwrap_or_default()
    } else {
        payload.redirect_uris
    };

    let mut client = ClientRepresentation::new_public(&payload.client_id, redirect_uris);
    client.name = payload.name;
    client.description = payload.description;

    state.keycloak.create_client(&name, &client).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// DELETE /api/v1/domains/:name/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    require_domain(&state, &name).await?;

    state.keycloak.delete_client(&name, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/domains/:name/clients/:id/state — enable or disable.
pub async fn set_client_state(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
    Json(payload): Json<ClientStateRequest>,
) -> Result<Json<ClientRepresentation>, AppError> {
    require_domain(&state, &name).await?;

    let client = state
        .keycloak
        .set_client_enabled(&name, &id, payload.enabled)
        .await?;
    Ok(Json(client))
}
