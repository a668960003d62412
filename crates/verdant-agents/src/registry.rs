use crate::agent::{Agent, DomainAgent};
use crate::completion::CompletionClient;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use verdant_types::AgentType;

/// In-process agents keyed by the type they serve.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentType, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one [`DomainAgent`] per agent type, all sharing `client`.
    pub fn with_defaults(client: Arc<dyn CompletionClient>) -> Self {
        let mut registry = Self::new();
        for agent_type in AgentType::ALL {
            registry.insert(Arc::new(DomainAgent::new(agent_type, client.clone())));
        }
        registry
    }

    /// Registers `agent` under its own type, replacing any previous entry.
    pub fn insert(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.agent_type(), agent);
    }

    pub fn get(&self, agent_type: AgentType) -> Option<Arc<dyn Agent>> {
        self.agents.get(&agent_type).cloned()
    }

    /// Returns the agents for `types`, skipping any that are not registered.
    pub fn select(&self, types: &[AgentType]) -> Vec<Arc<dyn Agent>> {
        types.iter().filter_map(|t| self.get(*t)).collect()
    }

    pub fn agent_types(&self) -> BTreeSet<AgentType> {
        self.agents.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.agent_types())
            .finish()
    }
}
