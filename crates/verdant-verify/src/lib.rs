//! Cross-agent verification for the Verdant platform.
//!
//! Decides whether a primary agent's answer can be trusted without a human
//! in the loop. A set of secondary agents each judge the primary answer and
//! answer the same query independently; their verdicts are combined with a
//! majority rule, their confidences are averaged (or penalised when they
//! disagree), and a recommendation is chosen from a fixed table.
//!
//! The scoring helpers in [`consensus`] are pure and can also be applied to
//! any set of [`AgentResponse`](verdant_types::AgentResponse)s.

pub mod consensus;
pub mod service;

pub use consensus::{
    aggregate_confidence, calculate_confidence_score, detect_discrepancies, recommend,
};
pub use service::{VerificationService, DEFAULT_VERIFIER_TIMEOUT};
