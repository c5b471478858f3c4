use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod cli;
mod config;
mod errors;
mod keycloak;
mod models;
mod store;

use auth::TokenService;
use keycloak::KeycloakAdmin;
use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub keycloak: KeycloakAdmin,
    pub tokens: TokenService,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "unilock=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Token { command }) => handle_token_command(command, &cfg),
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    tracing::info!("Connecting to Keycloak admin API at {}", cfg.keycloak_url);
    let kc = KeycloakAdmin::new(&cfg);

    let tokens = TokenService::new(&cfg);

    let state = Arc::new(AppState {
        db,
        keycloak: kc,
        tokens,
        config: cfg,
    });

    let app = axum::Router::new()
        // Health endpoints (no auth)
        .route("/healthz", get(health_check))
        .route("/readyz", get(readiness_check))
        // Token issuance + scope-gate probes
        .nest("/auth", api::auth_routes::auth_router(state.clone()))
        // Management API — nested under /api/v1 (admin scope enforced there)
        .nest("/api/v1", api::api_router(state.clone()))
        // Uploaded logos
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state.clone())
        // Logo uploads are the largest accepted bodies
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::{HeaderName, Method};
            use tower_http::cors::AllowOrigin;
            let allowed = state.config.cors_origins.clone();
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    allowed.iter().any(|o| o == origin_str)
                }))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::PATCH,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                    HeaderName::from_static("x-request-id"),
                ])
                .allow_credentials(true)
        })
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Unilock gateway listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness: the gateway is only useful with a reachable database.
async fn readiness_check(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<&'static str, axum::http::StatusCode> {
    sqlx::query("SELECT 1")
        .execute(state.db.pool())
        .await
        .map_err(|e| {
            tracing::error!("readiness check failed: {}", e);
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        })?;
    Ok("ok")
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows clients to correlate errors with gateway logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

/// Middleware: injects security headers into every response.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());
    headers.insert("Cache-Control", "no-store".parse().unwrap());
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());
    headers.remove("Server");

    resp
}

fn handle_token_command(cmd: cli::TokenCommands, cfg: &config::Config) -> anyhow::Result<()> {
    match cmd {
        cli::TokenCommands::Issue {
            subject,
            scopes,
            ttl_minutes,
        } => {
            let svc = TokenService::new(cfg);
            let scope_refs: Vec<&str> = scopes.iter().map(String::as_str).collect();
            let ttl = ttl_minutes.map(chrono::Duration::minutes);
            let token = svc.issue(&subject, &scope_refs, ttl)?;
            println!(
                "Token issued:\n  Subject: {}\n  Scopes:  {}\n  Use:     Authorization: Bearer {}",
                subject,
                scope_refs.join(","),
                token
            );
        }
    }
    Ok(())
}
