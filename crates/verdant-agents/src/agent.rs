use crate::completion::{parse_json_object, CompletionClient};
use crate::error::AgentError;
use crate::profile::{profile_for, AgentProfile, REVIEW_THRESHOLD};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, warn};
use verdant_types::{clamp_confidence, AgentResponse, AgentType, Metadata, VerificationCheck};

/// Text returned to the caller when an agent cannot produce any answer.
pub const DEGRADED_RESPONSE: &str =
    "I'm sorry, I was unable to process this request. Please try again or consult a specialist.";

/// What came of asking an agent a question.
///
/// `Answered` carries a real answer, however low its confidence. `Failed`
/// means no answer could be produced; its `response` is a zero-confidence
/// placeholder flagged for human review so aggregators always get a
/// well-formed [`AgentResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Answered(AgentResponse),
    Failed {
        response: AgentResponse,
        reason: String,
    },
}

impl AgentOutcome {
    fn failed(agent: AgentType, err: &AgentError) -> Self {
        AgentOutcome::Failed {
            response: AgentResponse::degraded(agent, DEGRADED_RESPONSE),
            reason: err.to_string(),
        }
    }

    pub fn response(&self) -> &AgentResponse {
        match self {
            AgentOutcome::Answered(response) => response,
            AgentOutcome::Failed { response, .. } => response,
        }
    }

    pub fn into_response(self) -> AgentResponse {
        match self {
            AgentOutcome::Answered(response) => response,
            AgentOutcome::Failed { response, .. } => response,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, AgentOutcome::Answered(_))
    }
}

/// A role-specialised query responder.
#[async_trait]
pub trait Agent: Send + Sync {
    fn agent_type(&self) -> AgentType;

    /// Answers `query`. Never fails: producer errors become
    /// [`AgentOutcome::Failed`].
    async fn process_query(&self, query: &str, context: Option<&Value>) -> AgentOutcome;

    /// Judges another agent's answer to `query`.
    async fn verify_against(
        &self,
        primary: &AgentResponse,
        query: &str,
    ) -> Result<VerificationCheck, AgentError>;
}

/// The single parameterised implementation behind every domain agent.
#[derive(Clone)]
pub struct DomainAgent {
    profile: &'static AgentProfile,
    client: Arc<dyn CompletionClient>,
}

impl DomainAgent {
    pub fn new(agent_type: AgentType, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            profile: profile_for(agent_type),
            client,
        }
    }

    pub fn profile(&self) -> &'static AgentProfile {
        self.profile
    }

    async fn answer(&self, query: &str, context: Option<&Value>) -> Result<AgentResponse, AgentError> {
        if query.trim().is_empty() {
            return Err(AgentError::EmptyQuery);
        }
        let prompt = build_query_prompt(self.profile, query, context);
        let text = self.client.complete(&prompt, true).await?;
        let parsed = parse_json_object(&text)?;
        shape_response(self.profile, parsed)
    }
}

#[async_trait]
impl Agent for DomainAgent {
    fn agent_type(&self) -> AgentType {
        self.profile.agent_type
    }

    async fn process_query(&self, query: &str, context: Option<&Value>) -> AgentOutcome {
        let agent = self.profile.agent_type;
        match self.answer(query, context).await {
            Ok(response) => {
                info!(
                    agent = %agent,
                    confidence = response.confidence,
                    review = response.requires_human_verification,
                    "agent answered query"
                );
                AgentOutcome::Answered(response)
            }
            Err(e) => {
                warn!(agent = %agent, "agent failed to answer query: {}", e);
                AgentOutcome::failed(agent, &e)
            }
        }
    }

    async fn verify_against(
        &self,
        primary: &AgentResponse,
        query: &str,
    ) -> Result<VerificationCheck, AgentError> {
        let prompt = build_verification_prompt(self.profile, primary, query);
        let text = self.client.complete(&prompt, true).await?;
        let verdict = parse_json_object(&text)?;
        parse_verdict(verdict)
    }
}

fn build_query_prompt(profile: &AgentProfile, query: &str, context: Option<&Value>) -> String {
    let mut prompt = format!("{}\n\n{}\n\n", profile.role, profile.instructions);
    prompt.push_str(
        "Respond with a single JSON object with these fields:\n\
         - \"response\": your answer as plain text\n\
         - \"confidence\": a number from 0 to 100\n\
         - \"sources\": an array of citation strings\n\
         - \"requiresHumanVerification\": true if a human expert must review the answer\n",
    );
    for field in profile.metadata_fields {
        let _ = writeln!(prompt, "- \"{}\"", field);
    }
    let _ = write!(prompt, "\nQuery: {}\n", query);
    if let Some(context) = context.filter(|c| !c.is_null()) {
        let _ = write!(prompt, "\nContext: {}\n", context);
    }
    prompt
}

fn build_verification_prompt(profile: &AgentProfile, primary: &AgentResponse, query: &str) -> String {
    format!(
        "{role}\n\n\
         You are independently verifying an answer produced by the {agent} agent.\n\n\
         Query: {query}\n\n\
         Answer (confidence {confidence}): {answer}\n\n\
         Respond with a single JSON object with these fields:\n\
         - \"agrees\": true if the answer is accurate and safe to act on\n\
         - \"confidence\": your confidence in the answer, from 0 to 100\n\
         - \"discrepancies\": an array of specific problems, empty if none\n\
         - \"recommendation\": one sentence of advice to the user\n",
        role = profile.role,
        agent = primary.agent,
        query = query,
        confidence = primary.confidence,
        answer = primary.response,
    )
}

/// Turns the model's JSON object into an [`AgentResponse`], validating the
/// profile's expected metadata fields.
fn shape_response(profile: &AgentProfile, mut parsed: Metadata) -> Result<AgentResponse, AgentError> {
    let response = match parsed.remove("response") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        _ => {
            return Err(AgentError::MalformedOutput(
                "missing \"response\" text".to_string(),
            ))
        }
    };

    let model_confidence = parsed.remove("confidence").and_then(|v| v.as_f64());
    let sources = string_list(parsed.remove("sources"));
    let model_flag = parsed
        .remove("requiresHumanVerification")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    // Some models nest the domain fields under "metadata".
    let nested = match parsed.remove("metadata") {
        Some(Value::Object(map)) => map,
        _ => Metadata::new(),
    };

    let mut metadata = Metadata::new();
    let mut missing = Vec::new();
    for field in profile.metadata_fields {
        match parsed.get(*field).or_else(|| nested.get(*field)) {
            Some(value) if !value.is_null() => {
                metadata.insert((*field).to_string(), value.clone());
            }
            _ => missing.push(*field),
        }
    }
    if !missing.is_empty() {
        warn!(
            agent = %profile.agent_type,
            missing = ?missing,
            "model omitted expected metadata fields"
        );
    }

    let confidence = profile
        .confidence_policy
        .score(model_confidence, sources.len());
    let high_risk = metadata
        .get("riskLevel")
        .and_then(|v| v.as_str())
        .is_some_and(|level| level.eq_ignore_ascii_case("high"));

    Ok(AgentResponse {
        agent: profile.agent_type,
        response,
        confidence,
        sources,
        metadata,
        requires_human_verification: model_flag
            || high_risk
            || !missing.is_empty()
            || confidence < REVIEW_THRESHOLD,
    })
}

/// Non-empty strings from a JSON array; anything else yields an empty list.
fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_verdict(mut verdict: Metadata) -> Result<VerificationCheck, AgentError> {
    let agrees = verdict
        .remove("agrees")
        .and_then(|v| v.as_bool())
        .ok_or_else(|| AgentError::MalformedOutput("missing \"agrees\" flag".to_string()))?;
    let confidence = verdict
        .remove("confidence")
        .and_then(|v| v.as_f64())
        .map(clamp_confidence)
        .unwrap_or(0);
    let discrepancies = string_list(verdict.remove("discrepancies"));
    let recommendation = verdict
        .remove("recommendation")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    Ok(VerificationCheck {
        consensus_reached: agrees,
        final_confidence: confidence,
        discrepancies,
        recommendation,
    })
}
