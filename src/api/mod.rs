use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::{self, TokenData};
use crate::errors::AppError;
use crate::AppState;

pub mod auth_routes;
pub mod clients;
pub mod domains;
pub mod identity_providers;
pub mod theme;

/// Build the management API router.
/// All routes are relative — the caller mounts this under `/api/v1`.
/// Every route requires a bearer token carrying the `admin` scope.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/domains",
            get(domains::list_domains).post(domains::create_domain),
        )
        .route(
            "/domains/:name",
            get(domains::get_domain).patch(domains::update_domain),
        )
        .route(
            "/domains/:name/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route("/domains/:name/clients/:id", delete(clients::delete_client))
        .route(
            "/domains/:name/clients/:id/state",
            patch(clients::set_client_state),
        )
        .route(
            "/domains/:name/identity-providers",
            get(identity_providers::list_providers).post(identity_providers::create_provider),
        )
        .route(
            "/domains/:name/identity-providers/:alias",
            get(identity_providers::get_provider).put(identity_providers::update_provider),
        )
        .route(
            "/domains/:name/theme",
            get(theme::get_theme).put(theme::update_theme),
        )
        .route("/domains/:name/theme/logo", post(theme::upload_logo))
        .layer(middleware::from_fn_with_state(state, require_admin))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Verify the request's bearer token against the token service.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<TokenData, AppError> {
    let token = bearer_token(headers).ok_or(AppError::InvalidToken)?;
    state.tokens.verify(token)
}

/// Middleware: verified token with the `admin` scope, or 401/403.
/// The verified identity is stored in request extensions for handlers.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token_data = authenticate(&state, req.headers())?;
    auth::admin_required(&token_data)?;
    req.extensions_mut().insert(token_data);
    Ok(next.run(req).await)
}

/// Middleware: verified token with the `user` scope, or 401/403.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token_data = authenticate(&state, req.headers())?;
    auth::user_required(&token_data)?;
    req.extensions_mut().insert(token_data);
    Ok(next.run(req).await)
}
