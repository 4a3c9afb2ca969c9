//! REST API Server (hub)
//!
//! Serves the chat completion endpoint plus the operational surface:
//! provider status, routing analytics, and the manual failure toggle.

mod analytics;
mod chat;
mod common;
mod providers;

pub use common::{ApiError, ApiResult};

use crate::route;
use crate::{Result, VERSION};

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Routing engine
    pub router: Arc<route::Router>,
}

impl AppState {
    pub fn new(router: Arc<route::Router>) -> Self {
        AppState { router }
    }
}

/// Create the main router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(hello))
        .route("/version", get(version))
        .route("/chat/completions", post(chat::chat_completions))
        .route("/providers", get(providers::get_providers))
        .route("/simulate/failure", post(providers::simulate_failure))
        .route("/routing/analytics", get(analytics::get_analytics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the REST API server
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let router = create_router(state);
    info!("Starting REST API server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .await
        .map_err(crate::Error::Io)?;
    Ok(())
}

async fn hello() -> Json<Value> {
    Json(json!({ "hello": "llm-gateway" }))
}

async fn version() -> Json<Value> {
    Json(json!({ "version": VERSION }))
}
