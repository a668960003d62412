//! Federation node and routing types.

use crate::{AgentType, NodeType};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A node is active while its last heartbeat is at most this many seconds old.
pub const NODE_LIVENESS_SECONDS: i64 = 5 * 60;

/// A registered endpoint capable of serving one or more agent types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedNode {
    /// Unique node identifier.
    pub id: String,
    /// Whether the node is on premises or hosted.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Base URL used when forwarding queries to this node.
    pub endpoint: String,
    /// Agent types this node can serve.
    pub agents: BTreeSet<AgentType>,
    /// Time of the last liveness signal.
    pub last_heartbeat: DateTime<Utc>,
    /// Opaque trust token presented when forwarding. Not cryptographically
    /// verified by any transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_fingerprint: Option<String>,
}

impl FederatedNode {
    /// Returns true if this node advertises `agent_type`.
    pub fn serves(&self, agent_type: AgentType) -> bool {
        self.agents.contains(&agent_type)
    }

    /// Returns true if the node heartbeat is within the liveness window at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now - self.last_heartbeat <= Duration::seconds(NODE_LIVENESS_SECONDS)
    }
}

/// Registration payload for a new (or re-registered) node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRegistration {
    /// Node identifier; one is generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub endpoint: String,
    pub agents: BTreeSet<AgentType>,
    #[serde(default)]
    pub certificate_fingerprint: Option<String>,
}

/// A request to answer `query` with an agent of type `agent_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationRequest {
    pub agent_type: AgentType,
    pub query: String,
    /// Identifier of the requesting node.
    pub source_node: String,
    /// Hint that the caller wants an encrypted, authenticated channel.
    /// Not enforced by the HTTP transport.
    #[serde(default)]
    pub requires_secure_channel: bool,
    /// Optional caller context passed through to the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Freshly generated node identity material.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeCredentials {
    pub node_id: String,
    /// Base64-encoded public key.
    pub certificate: String,
    /// Base64-encoded private key.
    pub private_key: String,
}

impl fmt::Debug for NodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCredentials")
            .field("node_id", &self.node_id)
            .field("certificate", &self.certificate)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}
