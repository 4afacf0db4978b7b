//!
//! shopfront HTTP server
//! ---------------------
//! This module defines the Axum-based HTTP API for the storefront.
//!
//! Responsibilities:
//! - Startup sequence: resolve the store location, provision it (create the
//!   file once, apply the schema once, seed the catalog when empty) and open
//!   the shared store handle.
//! - Catalog endpoints delegating to the `catalog` module.
//! - Register/login endpoints backed by the `security` module, with login
//!   attaching the session cookie minted by the `session` module.
//! - The session-guarded order stub (nothing is persisted).
//! - Static file serving for the bundled `public/` frontend, CORS and
//!   per-request logging.

use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use crate::storage::{self, Store, provision};
use crate::{catalog, security, session};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Start the shopfront HTTP server on the given port.
///
/// Provisioning order matters: the existence check runs before the connection
/// is opened (SQLite would otherwise create the file and hide the first-run
/// signal), the schema is applied only on first creation, and the seed check
/// runs on every start as a safety net for pre-existing empty files. A failed
/// schema apply is logged and the process continues; the schema may already
/// match or the operator can apply it out-of-band. Only a failure to open the
/// store connection is fatal.
pub async fn run_with_port(port: u16) -> anyhow::Result<()> {
    let target = storage::resolve();
    info!(
        target: "startup",
        "store resolved: path={}, busy_timeout_ms={}, shared_cache={}",
        target.path.display(), target.busy_timeout_ms, target.shared_cache
    );

    let created = provision::ensure_store_file(&target);
    let store = Store::open(&target)
        .with_context(|| format!("While opening store at {}", target.path.display()))?;

    if created {
        if let Err(e) = provision::apply_schema(&store, provision::SCHEMA_SQL).await {
            warn!("schema apply warning: {e}");
        }
    }
    match provision::seed_if_empty(&store).await {
        Ok(0) => {}
        Ok(n) => info!("seeded {n} reference products"),
        Err(e) => warn!("product seed warning: {e}"),
    }

    let app = router(AppState { store });
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using the default port.
pub async fn run() -> anyhow::Result<()> {
    run_with_port(8080).await
}

/// Build the router with all routes mounted. Public so integration tests can
/// drive the API in-process against a temporary store.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product_by_id))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/order", post(order))
        .nest_service("/public", ServeDir::new("public"))
        .route_service("/", ServeFile::new("public/index.html"))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    info!(target: "http", "{} {}", req.method(), req.uri().path());
    next.run(req).await
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    email: String,
    password: String,
}

async fn products(State(state): State<AppState>) -> Response {
    match catalog::list(&state.store).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => {
            error!("product list failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status":"error","error": e.to_string()}))).into_response()
        }
    }
}

async fn product_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match catalog::by_id(&state.store, id).await {
        Ok(Some(p)) => (StatusCode::OK, Json(p)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({"status":"not found"}))).into_response(),
        Err(e) => {
            error!("product lookup failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status":"error","error": e.to_string()}))).into_response()
        }
    }
}

async fn register(State(state): State<AppState>, Json(payload): Json<AuthPayload>) -> Response {
    match security::register(&state.store, &payload.email, &payload.password).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status":"registered"}))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn login(State(state): State<AppState>, Json(payload): Json<AuthPayload>) -> Response {
    match security::authenticate(&state.store, &payload.email, &payload.password).await {
        Ok(()) => {
            let Some(cookie) = session::issue(&payload.email) else {
                error!("session cookie rejected for identity");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"status":"error","error":"session issue failed"}))).into_response();
            };
            let mut headers = HeaderMap::new();
            headers.insert(header::SET_COOKIE, cookie);
            (StatusCode::OK, headers, Json(json!({"status":"ok"}))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Order intake stub: demonstrates the session contract without persisting
/// anything. Consumes the session artifact read-only.
async fn order(headers: HeaderMap) -> Response {
    let Some(_email) = session::read(&headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status":"auth required"}))).into_response();
    };
    (StatusCode::OK, Json(json!({"status":"order accepted"}))).into_response()
}
