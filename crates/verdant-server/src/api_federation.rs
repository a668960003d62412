use crate::api::{require_query, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use verdant_federation::{generate_node_credentials, SOURCE_NODE_HEADER};
use verdant_types::{
    AgentResponse, FederatedNode, FederationRequest, NodeCredentials, NodeRegistration,
};

/// Response body for node registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterNodeResponse {
    pub node_id: String,
}

/// Handler for `POST /api/federation/route`.
///
/// Client entry point: picks a node for the request's agent type and returns
/// that node's answer.
pub async fn route_query_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<FederationRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    require_query(&request.query)?;
    let response = state.federation.route_query(&request).await?;
    Ok(Json(response))
}

/// Handler for `POST /api/federation/query`.
///
/// Receives a query forwarded by a peer and answers it in-process. The
/// certificate fingerprint header is accepted but not checked.
pub async fn receive_query_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<FederationRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let source = headers
        .get(SOURCE_NODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(request.source_node.as_str());
    tracing::info!(
        source_node = source,
        agent = %request.agent_type,
        "received forwarded query"
    );
    if request.requires_secure_channel {
        tracing::warn!(
            source_node = source,
            "secure channel requested but the transport does not provide one"
        );
    }

    require_query(&request.query)?;
    let response = state.federation.process_locally(&request).await?;
    Ok(Json(response))
}

/// Handler for `POST /api/federation/nodes`.
pub async fn register_node_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(registration): Json<NodeRegistration>,
) -> Result<Json<RegisterNodeResponse>, ApiError> {
    if registration.endpoint.trim().is_empty() {
        return Err(ApiError::BadRequest("endpoint must not be empty".to_string()));
    }
    let node_id = state.federation.register_local_node(registration);
    Ok(Json(RegisterNodeResponse { node_id }))
}

/// Handler for `POST /api/federation/nodes/{nodeId}/heartbeat`.
///
/// Always 204; heartbeats for unknown nodes are ignored.
pub async fn heartbeat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(node_id): Path<String>,
) -> StatusCode {
    state.federation.update_heartbeat(&node_id);
    StatusCode::NO_CONTENT
}

/// Handler for `GET /api/federation/nodes/active`.
pub async fn active_nodes_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<FederatedNode>> {
    Json(state.federation.get_active_nodes())
}

/// Handler for `POST /api/federation/credentials`.
pub async fn credentials_handler() -> Json<NodeCredentials> {
    Json(generate_node_credentials())
}
