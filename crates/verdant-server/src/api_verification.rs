//! Cross-verification endpoints.

use crate::api::{require_query, ApiError};
use crate::AppState;
use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use verdant_types::{AgentResponse, AgentType, VerificationResult};
use verdant_verify::{calculate_confidence_score, detect_discrepancies};

/// Request body for `POST /api/verification/cross-verify`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossVerifyRequest {
    pub agent_type: AgentType,
    pub query: String,
    /// Verifier agent types. When empty, every other loaded agent verifies.
    #[serde(default)]
    pub verifiers: Vec<AgentType>,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossVerifyResponse {
    pub primary: AgentResponse,
    pub verification: VerificationResult,
}

/// Request body for `POST /api/verification/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub responses: Vec<AgentResponse>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub score: u8,
    pub discrepancies: Vec<String>,
}

/// Handler for `POST /api/verification/cross-verify`.
///
/// Answers the query with the primary agent, then cross-checks that answer
/// against the verifiers. The primary agent never verifies itself.
pub async fn cross_verify_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CrossVerifyRequest>,
) -> Result<Json<CrossVerifyResponse>, ApiError> {
    require_query(&payload.query)?;
    let agents = state.federation.agents();

    let primary_agent = agents.get(payload.agent_type).ok_or_else(|| {
        ApiError::NotFound(format!("agent not loaded: {}", payload.agent_type))
    })?;

    let mut verifier_types: Vec<AgentType> = if payload.verifiers.is_empty() {
        agents.agent_types().into_iter().collect()
    } else {
        payload.verifiers.clone()
    };
    verifier_types.retain(|t| *t != payload.agent_type);
    let mut seen = std::collections::HashSet::new();
    verifier_types.retain(|t| seen.insert(*t));

    if let Some(missing) = verifier_types.iter().find(|t| agents.get(**t).is_none()) {
        return Err(ApiError::NotFound(format!(
            "verifier agent not loaded: {}",
            missing
        )));
    }
    let verifiers = agents.select(&verifier_types);

    let primary = primary_agent
        .process_query(&payload.query, payload.context.as_ref())
        .await
        .into_response();
    let verification = state
        .verification
        .perform_cross_verification(&primary, &verifiers, &payload.query)
        .await;

    Ok(Json(CrossVerifyResponse {
        primary,
        verification,
    }))
}

/// Handler for `POST /api/verification/analyze`: scores an arbitrary set of
/// responses without calling any agent.
pub async fn analyze_handler(Json(payload): Json<AnalyzeRequest>) -> Json<AnalyzeResponse> {
    Json(AnalyzeResponse {
        score: calculate_confidence_score(&payload.responses),
        discrepancies: detect_discrepancies(&payload.responses),
    })
}
