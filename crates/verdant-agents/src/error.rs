use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM endpoint returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("LLM returned no completion")]
    EmptyCompletion,

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Prompt exceeds maximum size: {size} bytes (limit: {limit} bytes)")]
    PromptTooLarge { size: usize, limit: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Empty query")]
    EmptyQuery,
}
