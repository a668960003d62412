//! Verdant server library logic.

pub mod api;
pub mod api_agents;
pub mod api_federation;
pub mod api_verification;
pub mod background;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use verdant_agents::{AgentError, AgentRegistry, OpenAiClient};
use verdant_federation::{FederationError, FederationManager};
use verdant_verify::VerificationService;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Node registry, router, and the in-process agents.
    pub federation: Arc<FederationManager>,
    /// Cross-verification settings.
    pub verification: VerificationService,
}

impl AppState {
    pub fn new(federation: FederationManager, verification: VerificationService) -> Self {
        Self {
            federation: Arc::new(federation),
            verification,
        }
    }
}

/// Errors that prevent the server state from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build LLM client: {0}")]
    Llm(#[from] AgentError),
    #[error("failed to build federation manager: {0}")]
    Federation(#[from] FederationError),
}

/// Builds the shared state from configuration: one agent per domain over a
/// shared completion client, this node's federation manager, and the
/// configured static peers.
pub fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let client = OpenAiClient::new(config.llm.clone())?;
    if !client.is_enabled() {
        tracing::warn!("no LLM API key configured; every agent answer will be degraded");
    }
    let agents = AgentRegistry::with_defaults(Arc::new(client));

    let federation = FederationManager::new(
        config.federation.node_id.clone(),
        config.public_endpoint(),
        agents,
        Duration::from_secs(config.federation.forward_timeout_seconds),
    )?;
    for peer in &config.federation.peers {
        let node_id = federation.register_local_node(peer.clone().into());
        tracing::info!(node_id = %node_id, endpoint = %peer.endpoint, "registered static peer");
    }

    let verification = VerificationService::new(Duration::from_secs(
        config.verification.verifier_timeout_seconds,
    ));

    Ok(AppState::new(federation, verification))
}

const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/agents", get(api_agents::list_agents_handler))
        .route(
            "/api/agents/{agentType}/query",
            post(api_agents::query_agent_handler),
        )
        .route(
            "/api/federation/route",
            post(api_federation::route_query_handler),
        )
        .route(
            "/api/federation/query",
            post(api_federation::receive_query_handler),
        )
        .route(
            "/api/federation/nodes",
            post(api_federation::register_node_handler),
        )
        .route(
            "/api/federation/nodes/active",
            get(api_federation::active_nodes_handler),
        )
        .route(
            "/api/federation/nodes/{nodeId}/heartbeat",
            post(api_federation::heartbeat_handler),
        )
        .route(
            "/api/federation/credentials",
            post(api_federation::credentials_handler),
        )
        .route(
            "/api/verification/cross-verify",
            post(api_verification::cross_verify_handler),
        )
        .route(
            "/api/verification/analyze",
            post(api_verification::analyze_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
