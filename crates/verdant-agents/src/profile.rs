//! Role prompts and scoring rules for each domain agent.
//!
//! Every domain agent runs the same pipeline; the only things that vary are
//! the role text, the metadata fields requested from the model, and how the
//! model's confidence is turned into the published score.

use verdant_types::{clamp_confidence, AgentType};

/// Answers scoring below this always require human review.
pub const REVIEW_THRESHOLD: u8 = 70;

/// Confidence assumed when the model does not report one.
const DEFAULT_MODEL_CONFIDENCE: f64 = 50.0;

/// Bonus per cited source under [`ConfidencePolicy::SourceWeighted`].
const SOURCE_BONUS: u32 = 5;

/// Ceiling under [`ConfidencePolicy::SourceWeighted`].
const SOURCE_WEIGHTED_CAP: u32 = 95;

/// How a model-reported confidence becomes the published score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidencePolicy {
    /// The raw model confidence, clamped to `0..=100`. Missing means 0.
    RawClamped,
    /// The model confidence plus a bonus per cited source, capped at 95.
    SourceWeighted,
}

impl ConfidencePolicy {
    pub fn score(self, model_confidence: Option<f64>, source_count: usize) -> u8 {
        match self {
            ConfidencePolicy::RawClamped => clamp_confidence(model_confidence.unwrap_or(0.0)),
            ConfidencePolicy::SourceWeighted => {
                let base = u32::from(clamp_confidence(
                    model_confidence.unwrap_or(DEFAULT_MODEL_CONFIDENCE),
                ));
                let bonus = SOURCE_BONUS.saturating_mul(source_count as u32);
                base.saturating_add(bonus).min(SOURCE_WEIGHTED_CAP) as u8
            }
        }
    }
}

/// Static description of one domain agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentProfile {
    pub agent_type: AgentType,
    /// Opening line of every prompt.
    pub role: &'static str,
    /// Domain guidance appended after the role.
    pub instructions: &'static str,
    /// Metadata keys the model must return alongside the answer.
    pub metadata_fields: &'static [&'static str],
    pub confidence_policy: ConfidencePolicy,
}

static PROFILES: [AgentProfile; 9] = [
    AgentProfile {
        agent_type: AgentType::Compliance,
        role: "You are a cannabis regulatory compliance specialist.",
        instructions: "Answer with reference to state and local cannabis regulations. \
                       Name the regulation or agency behind each requirement and flag \
                       anything that varies by jurisdiction.",
        metadata_fields: &["category", "riskLevel", "regulations", "recommendations"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Formulation,
        role: "You are a cannabis product formulation chemist.",
        instructions: "Recommend formulations with cannabinoid ratios, carrier ingredients, \
                       and dosing per serving. Note stability and interaction concerns.",
        metadata_fields: &["productType", "ingredients", "dosage", "warnings"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Marketing,
        role: "You are a cannabis marketing strategist.",
        instructions: "Propose campaigns and copy that respect cannabis advertising \
                       restrictions: no appeal to minors, no health claims, and age-gated \
                       channels only.",
        metadata_fields: &["channels", "complianceNotes", "targetAudience"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Sourcing,
        role: "You are a cannabis supply-chain and sourcing analyst.",
        instructions: "Identify suppliers, certifications, and pricing considerations. \
                       Call out licensing requirements for each link in the supply chain.",
        metadata_fields: &["suppliers", "certifications", "considerations"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Patent,
        role: "You are a cannabis intellectual-property researcher.",
        instructions: "Summarise relevant patents and prior art, and assess novelty and \
                       freedom-to-operate risk. You do not give legal advice.",
        metadata_fields: &["patents", "noveltyAssessment", "riskLevel"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Spectra,
        role: "You are an analytical chemist interpreting cannabis lab spectra.",
        instructions: "Interpret chromatography and mass-spectrometry results, identify \
                       compounds with estimated concentrations, and flag contaminants \
                       above action limits.",
        metadata_fields: &["compounds", "contaminants", "method"],
        confidence_policy: ConfidencePolicy::RawClamped,
    },
    AgentProfile {
        agent_type: AgentType::CustomerSuccess,
        role: "You are a customer success manager for a cannabis business platform.",
        instructions: "Resolve the customer's issue with clear next steps, and note when \
                       escalation to a human account manager is warranted.",
        metadata_fields: &["issueCategory", "nextSteps", "escalate"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Operations,
        role: "You are a cannabis cultivation and retail operations consultant.",
        instructions: "Give operational guidance on cultivation, inventory, track-and-trace, \
                       and retail workflows, with measurable targets where possible.",
        metadata_fields: &["area", "actions", "metrics"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
    AgentProfile {
        agent_type: AgentType::Science,
        role: "You are a cannabinoid and terpene research scientist.",
        instructions: "Explain the relevant pharmacology and chemistry, citing peer-reviewed \
                       studies and stating the strength of the evidence.",
        metadata_fields: &["evidenceLevel", "compounds", "studies"],
        confidence_policy: ConfidencePolicy::SourceWeighted,
    },
];

/// Returns the profile for `agent_type`.
pub fn profile_for(agent_type: AgentType) -> &'static AgentProfile {
    PROFILES
        .iter()
        .find(|p| p.agent_type == agent_type)
        .unwrap_or(&PROFILES[0])
}
