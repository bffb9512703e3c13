//! Governance Backend
//!
//! A REST, WebSocket and SSE server for a data-governance product: the agent
//! registry and orchestrator, the intent-driven AI assistant, and thin
//! proxies for chat completions and policy question answering.

mod api;
mod config;
mod error;
mod events;
mod intent;
mod orchestrator;
mod services;
mod state;
mod websocket;

use api::RouterState;
use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use config::Config;
use orchestrator::Orchestrator;
use serde::Serialize;
use services::policy::PolicyStore;
use state::AppState;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Serialize)]
struct HelloResponse {
    message: String,
    status: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    message: String,
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Initialize application state with the built-in agent seed list
    let app_state = Arc::new(RwLock::new(AppState::new()));
    info!(
        agents = app_state.read().await.registry.len(),
        "Agent registry seeded"
    );

    let orchestrator = Arc::new(Orchestrator::new(app_state, config.simulation));

    // Index policy documents from the configured directory, if any
    let mut policies = PolicyStore::new();
    if let Some(docs_dir) = &config.policy.docs_dir {
        match policies.load_dir(Path::new(docs_dir)) {
            Ok(count) => info!("Indexed {} policy documents from {}", count, docs_dir),
            Err(e) => tracing::warn!("Failed to index policy documents: {}", e),
        }
    }

    let router_state = RouterState {
        orchestrator,
        policies: Arc::new(RwLock::new(policies)),
        http: reqwest::Client::new(),
        config: Arc::new(config.clone()),
    };

    // Build our application with routes
    let app = Router::new()
        // Health check and hello world
        .route("/", get(hello_world))
        .route("/api/health", get(health_check))
        // Agent management API
        .route(
            "/api/agents",
            get(api::agents::list_agents).post(api::agents::register_agent),
        )
        .route("/api/agents/:id", get(api::agents::get_agent))
        .route("/api/agents/:id/run", post(api::agents::run_agent))
        .route("/api/agents/:id/stop", post(api::agents::stop_agent))
        // Orchestration API
        .route("/api/orchestrate", post(api::orchestrate::orchestrate))
        .route("/api/workflows", get(api::orchestrate::list_workflows))
        .route(
            "/api/workflows/:name/run",
            post(api::orchestrate::run_workflow),
        )
        // AI assistant
        .route("/api/assistant/query", post(api::assistant::query))
        // Language-model collaborators
        .route("/api/chat", post(api::chat::chat))
        .route("/api/policy/upload", post(api::policy::upload))
        .route("/api/policy/ask", post(api::policy::ask))
        // WebSocket for real-time updates
        .route("/ws", get(websocket::websocket_handler))
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(router_state);

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

async fn hello_world() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from Governance Backend!".to_string(),
        status: "ok".to_string(),
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: "Backend is healthy".to_string(),
    })
}
