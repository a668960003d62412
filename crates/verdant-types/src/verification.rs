//! Verification report types.

use crate::AgentResponse;
use serde::{Deserialize, Serialize};

/// Discrepancy recorded for a verifier that errored or timed out.
pub const VERIFICATION_FAILED: &str = "Verification process failed";

/// Recommendation recorded for a verifier that errored or timed out.
pub const VERIFICATION_TECHNICAL_ERROR: &str = "Technical error during verification";

/// One verifier's judgment of a primary answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCheck {
    /// Whether the verifier agrees with the primary answer.
    pub consensus_reached: bool,
    /// The verifier's confidence in the primary answer, 0 to 100.
    pub final_confidence: u8,
    /// Points of disagreement, if any.
    #[serde(default)]
    pub discrepancies: Vec<String>,
    /// Free-text directive from the verifier.
    #[serde(default)]
    pub recommendation: String,
}

impl VerificationCheck {
    /// The degraded check contributed by a verifier that failed.
    pub fn failed() -> Self {
        Self {
            consensus_reached: false,
            final_confidence: 0,
            discrepancies: vec![VERIFICATION_FAILED.to_string()],
            recommendation: VERIFICATION_TECHNICAL_ERROR.to_string(),
        }
    }
}

/// Output of cross-checking a primary answer against several verifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Whether at least half (rounded up) of the verifiers agreed.
    pub consensus_reached: bool,
    /// Aggregated confidence, 0 to 100.
    pub final_confidence: u8,
    /// Every discrepancy reported by every verifier, in verifier order.
    pub discrepancies: Vec<String>,
    /// Human-readable directive chosen from the recommendation table.
    pub recommendation: String,
    /// Each verifier's independent answer to the same query.
    pub verifying_responses: Vec<AgentResponse>,
}
