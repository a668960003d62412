//! Shared API error type and helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use verdant_federation::FederationError;
use verdant_types::AgentType;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<FederationError> for ApiError {
    fn from(err: FederationError) -> Self {
        let message = err.to_string();
        match err {
            FederationError::NoNodeAvailable(_) | FederationError::LocalAgentUnavailable(_) => {
                ApiError::NotFound(message)
            }
            FederationError::Transport(_) | FederationError::RemoteStatus { .. } => {
                ApiError::BadGateway(message)
            }
            FederationError::Timeout { .. } => ApiError::GatewayTimeout(message),
        }
    }
}

/// Parses an agent type from a path segment.
pub(crate) fn parse_agent_type(raw: &str) -> Result<AgentType, ApiError> {
    raw.parse::<AgentType>()
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

/// Rejects blank query text.
pub(crate) fn require_query(query: &str) -> Result<(), ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }
    Ok(())
}
