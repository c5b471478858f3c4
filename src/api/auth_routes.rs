//! Authentication endpoints: token issuance and scope-gate probes.
//!
//! `/token` is a development login — it issues an admin-scoped token for a
//! fixed subject. Production credential validation is delegated to the
//! identity provider and deliberately not implemented here.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde::Serialize;
use serde_json::json;

use crate::auth::{TokenData, ADMIN_SCOPE};
use crate::errors::AppError;
use crate::AppState;

use super::{require_admin, require_user};

pub fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/token", post(login_for_access_token))
        .route(
            "/test-admin",
            get(test_admin_access)
                .layer(middleware::from_fn_with_state(state.clone(), require_admin)),
        )
        .route(
            "/test-user",
            get(test_user_access).layer(middleware::from_fn_with_state(state, require_user)),
        )
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /auth/token — issue an admin access token.
pub async fn login_for_access_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TokenResponse>, AppError> {
    let access_token =
        state
            .tokens
            .issue("admin@example.com", &[ADMIN_SCOPE], Some(Duration::minutes(30)))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/test-admin — succeeds only with the `admin` scope.
pub async fn test_admin_access(
    Extension(token): Extension<TokenData>,
) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Admin access successful",
        "user": token.subject,
    }))
}

/// GET /auth/test-user — succeeds only with the `user` scope.
pub async fn test_user_access(Extension(token): Extension<TokenData>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "User access successful",
        "user": token.subject,
    }))
}
