//! Domain agents for the Verdant platform.
//!
//! Each agent (compliance, formulation, marketing, sourcing, patent, spectra,
//! customer success, operations, science) is the same pipeline with a
//! different role profile: build a prompt from the role text, the query and
//! any caller context; ask an LLM completion endpoint for a JSON answer;
//! shape that answer into an [`AgentResponse`](verdant_types::AgentResponse).
//!
//! Agents never fail past their boundary. A failed model call or unparsable
//! output becomes [`AgentOutcome::Failed`], which still carries a
//! zero-confidence response flagged for human review.

pub mod agent;
pub mod completion;
pub mod config;
pub mod error;
pub mod profile;
pub mod registry;

pub use agent::{Agent, AgentOutcome, DomainAgent, DEGRADED_RESPONSE};
pub use completion::{parse_json_object, CompletionClient, OpenAiClient};
pub use config::LlmConfig;
pub use error::AgentError;
pub use profile::{profile_for, AgentProfile, ConfidencePolicy, REVIEW_THRESHOLD};
pub use registry::AgentRegistry;
