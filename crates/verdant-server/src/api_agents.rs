//! Direct agent queries, bypassing federation routing.

use crate::api::{parse_agent_type, require_query, ApiError};
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use verdant_types::{AgentResponse, AgentType};

/// Request body for `POST /api/agents/{agentType}/query`.
#[derive(Debug, Deserialize)]
pub struct AgentQueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<Value>,
}

/// Handler for `GET /api/agents`: the agent types served in-process.
pub async fn list_agents_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<AgentType>> {
    Json(state.federation.agents().agent_types().into_iter().collect())
}

/// Handler for `POST /api/agents/{agentType}/query`.
///
/// A failed model call still answers 200 with a zero-confidence response
/// flagged for human review.
pub async fn query_agent_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(agent_type): Path<String>,
    Json(payload): Json<AgentQueryRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent_type = parse_agent_type(&agent_type)?;
    require_query(&payload.query)?;

    let agent = state
        .federation
        .agents()
        .get(agent_type)
        .ok_or_else(|| ApiError::NotFound(format!("agent not loaded: {}", agent_type)))?;

    let outcome = agent
        .process_query(&payload.query, payload.context.as_ref())
        .await;
    Ok(Json(outcome.into_response()))
}
