//! Theme management: per-domain branding stored in the `theme_config`
//! JSONB column, plus logo upload.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::theme::ThemeConfig;
use crate::store::postgres::DomainRow;
use crate::AppState;

#[derive(Serialize)]
pub struct LogoUploadResponse {
    pub url: String,
}

async fn require_domain(state: &AppState, name: &str) -> Result<DomainRow, AppError> {
    state
        .db
        .get_domain(name)
        .await?
        .ok_or_else(|| AppError::DomainNotFound(name.to_string()))
}

/// GET /api/v1/domains/:name/theme — stored config, or defaults when unset.
pub async fn get_theme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ThemeConfig>, AppError> {
    let domain = require_domain(&state, &name).await?;
    Ok(Json(ThemeConfig::from_stored(domain.theme_config.as_ref())))
}

/// PUT /api/v1/domains/:name/theme — validate and store, mirroring the
/// login theme to the realm when one is set.
pub async fn update_theme(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(theme): Json<ThemeConfig>,
) -> Result<Json<ThemeConfig>, AppError> {
    require_domain(&state, &name).await?;
    theme.validate()?;

    let stored = serde_json::to_value(&theme)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("theme serialization failed: {}", e)))?;
    if !state.db.update_theme_config(&name, &stored).await? {
        return Err(AppError::DomainNotFound(name));
    }

    // Login theme lives in the realm itself; branding colors stay local.
    if theme.login_theme.is_some() {
        match state.keycloak.get_realm(&name).await {
            Ok(mut realm) => {
                realm.login_theme = theme.login_theme.clone();
                if let Err(e) = state.keycloak.update_realm(&name, &realm).await {
                    tracing::warn!("Could not mirror login theme to realm {}: {}", name, e);
                }
            }
            Err(e) => {
                tracing::warn!("Could not fetch realm {} for login-theme mirror: {}", name, e);
            }
        }
    }

    Ok(Json(theme))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// POST /api/v1/domains/:name/theme/logo — multipart upload.
///
/// The file lands under the logo directory named after the realm, and the
/// resulting URL is recorded in the domain's theme config.
pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<LogoUploadResponse>, AppError> {
    let domain = require_domain(&state, &name).await?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let ext = extension_for(&content_type).ok_or_else(|| {
            AppError::Validation(format!("unsupported logo content type: {}", content_type))
        })?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {}", e)))?;
        if data.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".into()));
        }

        upload = Some((format!("{}.{}", name, ext), data.to_vec()));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::Validation("missing 'file' form field".into()))?;

    tokio::fs::create_dir_all(&state.config.logo_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("could not create logo dir: {}", e)))?;
    let dest = std::path::Path::new(&state.config.logo_dir).join(&filename);
    tokio::fs::write(&dest, &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("could not write logo: {}", e)))?;

    let url = format!("/static/logos/{}", filename);

    let mut theme = ThemeConfig::from_stored(domain.theme_config.as_ref());
    theme.logo_url = Some(url.clone());
    let stored = serde_json::to_value(&theme)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("theme serialization failed: {}", e)))?;
    state.db.update_theme_config(&name, &stored).await?;

    tracing::info!("Stored logo for domain {} at {}", name, dest.display());
    Ok(Json(LogoUploadResponse { url }))
}

// ── Tests ────────────────────────────────────────────────────
