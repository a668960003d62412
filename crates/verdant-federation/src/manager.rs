use crate::error::FederationError;
use crate::transport::HttpTransport;
use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use verdant_agents::AgentRegistry;
use verdant_types::{
    AgentResponse, AgentType, FederatedNode, FederationRequest, NodeRegistration, NodeType,
};

/// Default deadline for a forwarded query.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Node registry and query router.
///
/// On construction the manager registers itself as a cloud node serving every
/// agent in its [`AgentRegistry`]. Nodes are kept in registration order,
/// which is also the order routing scans them in.
#[derive(Debug)]
pub struct FederationManager {
    node_id: String,
    nodes: RwLock<Vec<FederatedNode>>,
    agents: AgentRegistry,
    transport: HttpTransport,
}

impl FederationManager {
    pub fn new(
        node_id: impl Into<String>,
        endpoint: impl Into<String>,
        agents: AgentRegistry,
        forward_timeout: Duration,
    ) -> Result<Self, FederationError> {
        let node_id = node_id.into();
        let transport = HttpTransport::new(node_id.clone(), forward_timeout)?;
        let manager = Self {
            node_id: node_id.clone(),
            nodes: RwLock::new(Vec::new()),
            agents,
            transport,
        };
        manager.register_local_node(NodeRegistration {
            id: Some(node_id),
            node_type: NodeType::Cloud,
            endpoint: endpoint.into(),
            agents: manager.agents.agent_types(),
            certificate_fingerprint: None,
        });
        Ok(manager)
    }

    /// This process's own node id.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Agents answered in-process.
    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    fn read_nodes(&self) -> RwLockReadGuard<'_, Vec<FederatedNode>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_nodes(&self) -> RwLockWriteGuard<'_, Vec<FederatedNode>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a node, or replaces the one with the same id in place.
    ///
    /// A random id is assigned when none is given. The heartbeat is set to
    /// now. Returns the node id.
    pub fn register_local_node(&self, registration: NodeRegistration) -> String {
        let id = registration
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let node = FederatedNode {
            id: id.clone(),
            node_type: registration.node_type,
            endpoint: registration.endpoint,
            agents: registration.agents,
            last_heartbeat: Utc::now(),
            certificate_fingerprint: registration.certificate_fingerprint,
        };

        let mut nodes = self.write_nodes();
        match nodes.iter_mut().find(|n| n.id == id) {
            Some(existing) => *existing = node,
            None => nodes.push(node),
        }
        info!(node_id = %id, total_nodes = nodes.len(), "node registered");
        id
    }

    /// Refreshes a node's heartbeat. Unknown ids are ignored.
    pub fn update_heartbeat(&self, node_id: &str) {
        let mut nodes = self.write_nodes();
        match nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => node.last_heartbeat = Utc::now(),
            None => debug!(node_id, "heartbeat for unknown node ignored"),
        }
    }

    /// Every registered node, stale or not.
    pub fn nodes(&self) -> Vec<FederatedNode> {
        self.read_nodes().clone()
    }

    /// Nodes whose last heartbeat is within the liveness window.
    pub fn get_active_nodes(&self) -> Vec<FederatedNode> {
        self.get_active_nodes_at(Utc::now())
    }

    pub fn get_active_nodes_at(&self, now: DateTime<Utc>) -> Vec<FederatedNode> {
        self.read_nodes()
            .iter()
            .filter(|n| n.is_active_at(now))
            .cloned()
            .collect()
    }

    /// Picks the node for `agent_type`: the first local node serving it,
    /// else the first cloud node serving it.
    ///
    /// Staleness is not considered here.
    pub fn select_node(&self, agent_type: AgentType) -> Result<FederatedNode, FederationError> {
        let nodes = self.read_nodes();
        let serving = |node_type: NodeType| {
            nodes
                .iter()
                .find(|n| n.node_type == node_type && n.serves(agent_type))
        };
        serving(NodeType::Local)
            .or_else(|| serving(NodeType::Cloud))
            .cloned()
            .ok_or(FederationError::NoNodeAvailable(agent_type))
    }

    /// Routes a query to the selected node and returns its answer.
    ///
    /// A local node other than this one is reached over HTTP. Everything
    /// else is answered by the in-process agent for the requested type.
    pub async fn route_query(
        &self,
        request: &FederationRequest,
    ) -> Result<AgentResponse, FederationError> {
        let node = match self.select_node(request.agent_type) {
            Ok(node) => node,
            Err(e) => {
                warn!(agent = %request.agent_type, "routing failed: {}", e);
                return Err(e);
            }
        };

        if !node.is_active_at(Utc::now()) {
            warn!(
                node_id = %node.id,
                last_heartbeat = %node.last_heartbeat,
                "routing to a node with a stale heartbeat"
            );
        }

        if node.node_type == NodeType::Local && node.id != self.node_id {
            info!(
                agent = %request.agent_type,
                node_id = %node.id,
                source_node = %request.source_node,
                "forwarding query to local node"
            );
            return self.transport.forward(&node, request).await.map_err(|e| {
                error!(node_id = %node.id, "forward failed: {}", e);
                e
            });
        }

        debug!(agent = %request.agent_type, node_id = %node.id, "processing query in-process");
        self.process_locally(request).await
    }

    /// Answers `request` with this process's own agent for its type.
    pub async fn process_locally(
        &self,
        request: &FederationRequest,
    ) -> Result<AgentResponse, FederationError> {
        let agent = self.agents.get(request.agent_type).ok_or_else(|| {
            warn!(agent = %request.agent_type, "no in-process agent for routed query");
            FederationError::LocalAgentUnavailable(request.agent_type)
        })?;
        let outcome = agent
            .process_query(&request.query, request.context.as_ref())
            .await;
        Ok(outcome.into_response())
    }
}
