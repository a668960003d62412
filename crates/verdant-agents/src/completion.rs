use crate::config::LlmConfig;
use crate::error::AgentError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use verdant_types::Metadata;

/// Maximum prompt size sent to the model (256 KiB).
const MAX_PROMPT_BYTES: usize = 256 * 1024;

/// A text-generation capability.
///
/// When `expect_json` is set the implementation should ask the model for a
/// single JSON object. Callers still parse the returned text themselves and
/// treat anything unparsable as [`AgentError::MalformedOutput`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str, expect_json: bool) -> Result<String, AgentError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: LlmConfig,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { config, http })
    }

    /// Returns false when no API key is configured; every call will fail.
    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str, expect_json: bool) -> Result<String, AgentError> {
        if !self.is_enabled() {
            return Err(AgentError::Config("LLM API key is not configured".to_string()));
        }
        if prompt.len() > MAX_PROMPT_BYTES {
            return Err(AgentError::PromptTooLarge {
                size: prompt.len(),
                limit: MAX_PROMPT_BYTES,
            });
        }

        let mut body = json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });
        if expect_json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        tracing::debug!(
            model = %self.config.model,
            prompt_bytes = prompt.len(),
            expect_json,
            "requesting completion"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AgentError::EmptyCompletion)
    }
}

/// Extracts the JSON object from model output, tolerating a surrounding
/// markdown code fence.
pub fn parse_json_object(text: &str) -> Result<Metadata, AgentError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    match serde_json::from_str::<serde_json::Value>(unfenced) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(AgentError::MalformedOutput(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AgentError::MalformedOutput(e.to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
