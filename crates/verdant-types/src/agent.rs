//! The agent response envelope.

use crate::AgentType;
use serde::{Deserialize, Serialize};

/// Agent-specific structured fields (category, risk level, recommendations...).
///
/// The shape varies per agent type; each agent validates its own expected
/// fields when it builds a response.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// The result of one agent answering one query.
///
/// Created fresh per query and never mutated once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    /// The agent that produced this answer.
    pub agent: AgentType,
    /// Free-text answer content.
    pub response: String,
    /// Self-reported certainty, 0 to 100.
    pub confidence: u8,
    /// Citations, in the order the agent gave them.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Agent-specific structured fields.
    #[serde(default)]
    pub metadata: Metadata,
    /// Whether a human must review this answer before it is acted upon.
    pub requires_human_verification: bool,
}

impl AgentResponse {
    /// Builds the zero-confidence response returned when an agent could not
    /// produce an answer at all.
    pub fn degraded(agent: AgentType, message: impl Into<String>) -> Self {
        Self {
            agent,
            response: message.into(),
            confidence: 0,
            sources: Vec::new(),
            metadata: Metadata::new(),
            requires_human_verification: true,
        }
    }
}

/// Clamps an arbitrary model-reported confidence into `0..=100`.
///
/// Non-finite values clamp to 0.
pub fn clamp_confidence(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}
