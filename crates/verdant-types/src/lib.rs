//! Shared types for the Verdant cannabis-industry assistant.
//!
//! This crate defines the data contract every other Verdant crate speaks:
//! the [`AgentResponse`] envelope produced by each domain agent, the
//! [`VerificationResult`] produced by cross-agent verification, and the
//! federation types ([`FederatedNode`], [`FederationRequest`]) used to route
//! queries between nodes.
//!
//! No crate in the workspace depends on anything *except* `verdant-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

mod agent;
mod federation;
mod verification;

pub use agent::{clamp_confidence, AgentResponse, Metadata};
pub use federation::{
    FederatedNode, FederationRequest, NodeCredentials, NodeRegistration, NODE_LIVENESS_SECONDS,
};
pub use verification::{VerificationCheck, VerificationResult};

/// The domain specialisations an agent can serve.
///
/// Every agent differs only in its role prompt and the metadata it asks the
/// model for; the tag identifies which specialisation produced an answer and
/// which capability a federation node advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    /// Regulatory compliance (licensing, packaging, testing rules).
    Compliance,
    /// Product formulation and dosing.
    Formulation,
    /// Marketing copy within advertising restrictions.
    Marketing,
    /// Supplier and ingredient sourcing.
    Sourcing,
    /// Patent and intellectual-property research.
    Patent,
    /// Lab spectra and certificate-of-analysis interpretation.
    Spectra,
    /// Customer support and retention.
    CustomerSuccess,
    /// Cultivation and retail operations.
    Operations,
    /// Cannabinoid and terpene science.
    Science,
}

impl AgentType {
    /// Every agent type, in declaration order.
    pub const ALL: [AgentType; 9] = [
        AgentType::Compliance,
        AgentType::Formulation,
        AgentType::Marketing,
        AgentType::Sourcing,
        AgentType::Patent,
        AgentType::Spectra,
        AgentType::CustomerSuccess,
        AgentType::Operations,
        AgentType::Science,
    ];

    /// Returns the wire tag for this agent type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliance => "compliance",
            Self::Formulation => "formulation",
            Self::Marketing => "marketing",
            Self::Sourcing => "sourcing",
            Self::Patent => "patent",
            Self::Spectra => "spectra",
            Self::CustomerSuccess => "customer-success",
            Self::Operations => "operations",
            Self::Science => "science",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown agent type tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown agent type: {0}")]
pub struct ParseAgentTypeError(pub String);

impl FromStr for AgentType {
    type Err = ParseAgentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseAgentTypeError(s.to_string()))
    }
}

/// Where a federation node runs.
///
/// Local nodes keep data on premises and are preferred for data-sovereignty
/// reasons; cloud nodes are the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// On-premises node.
    Local,
    /// Hosted node.
    Cloud,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Local => write!(f, "local"),
            NodeType::Cloud => write!(f, "cloud"),
        }
    }
}
