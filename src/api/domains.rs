//! Domain management: each domain maps 1:1 to a Keycloak realm plus a
//! local metadata row.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::domain::{DomainCreate, DomainDetail, DomainUpdateRequest};
use crate::store::postgres::{DomainRow, DomainUpdate, NewDomain};
use crate::AppState;

#[derive(Deserialize)]
pub struct PaginationParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /api/v1/domains — create a Keycloak realm plus local metadata.
pub async fn create_domain(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DomainCreate>,
) -> Result<(StatusCode, Json<DomainRow>), AppError> {
    payload.validate()?;

    if state.db.domain_exists(&payload.name).await? {
        return Err(AppError::DomainExists(payload.name));
    }

    // Create the realm first; if the provider rejects it, nothing is
    // written locally.
    state
        .keycloak
        .create_realm(&payload.name, &payload.display_name)
        .await?;

    let row = state
        .db
        .insert_domain(&NewDomain {
            name: payload.name,
            display_name: payload.display_name,
            description: payload.description,
            default_client_redirect: payload.default_client_redirect,
        })
        .await?;

    tracing::info!("Created domain {}", row.name);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/domains — paginated list from the local store.
pub async fn list_domains(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<DomainRow>>, AppError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(100).clamp(1, 200);

    let domains = state.db.list_domains(skip, limit).await?;
    Ok(Json(domains))
}

/// GET /api/v1/domains/:name — local metadata merged with live realm info.
///
/// When the provider call fails the local row is still returned; the
/// dashboard degrades gracefully rather than erroring out.
pub async fn get_domain(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<DomainDetail>, AppError> {
    let domain = state
        .db
        .get_domain(&name)
        .await?
        .ok_or_else(|| AppError::DomainNotFound(name.clone()))?;

    let keycloak_info = match state.keycloak.get_realm(&name).await {
        Ok(info) => Some(info),
        Err(e) => {
            tracing::warn!("Could not fetch realm info for {}: {}", name, e);
            None
        }
    };

    Ok(Json(DomainDetail {
        domain,
        keycloak_info,
    }))
}

/// PATCH /api/v1/domains/:name — update local metadata, mirroring the
/// display name to the realm.
pub async fn update_domain(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<DomainUpdateRequest>,
) -> Result<Json<DomainRow>, AppError> {
    let row = state
        .db
        .update_domain(
            &name,
            &DomainUpdate {
                display_name: payload.display_name.clone(),
                description: payload.description,
                is_active: payload.is_active,
                default_client_redirect: payload.default_client_redirect,
            },
        )
        .await?
        .ok_or_else(|| AppError::DomainNotFound(name.clone()))?;

    // The realm's display name is cosmetic; a provider hiccup should not
    // fail an otherwise-committed metadata update.
    if payload.display_name.is_some() {
        match state.keycloak.get_realm(&name).await {
            Ok(mut realm) => {
                realm.display_name = Some(row.display_name.clone());
                if let Err(e) = state.keycloak.update_realm(&name, &realm).await {
                    tracing::warn!("Could not mirror display name to realm {}: {}", name, e);
                }
            }
            Err(e) => {
                tracing::warn!("Could not fetch realm {} for display-name mirror: {}", name, e);
            }
        }
    }

    Ok(Json(row))
}
