use std::time::Duration;
use thiserror::Error;
use verdant_types::AgentType;

#[derive(Debug, Error)]
pub enum FederationError {
    /// No registered node advertises the requested agent type.
    #[error("no node available for agent type: {0}")]
    NoNodeAvailable(AgentType),
    /// Routing chose in-process handling but no agent of that type is loaded.
    #[error("local agent not available: {0}")]
    LocalAgentUnavailable(AgentType),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The remote node answered with a non-success status.
    #[error("remote node {node_id} returned {status}")]
    RemoteStatus { node_id: String, status: String },
    #[error("forward to node {node_id} timed out after {}s", .timeout.as_secs())]
    Timeout { node_id: String, timeout: Duration },
}
