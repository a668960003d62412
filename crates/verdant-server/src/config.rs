//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use verdant_agents::LlmConfig;
use verdant_types::{AgentType, NodeRegistration, NodeType};

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Completion endpoint shared by every domain agent.
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub federation: FederationConfig,

    #[serde(default)]
    pub verification: VerificationConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "verdant_federation=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// This node's identity and its view of the federation.
#[derive(Debug, Clone, Deserialize)]
pub struct FederationConfig {
    /// Id this node registers itself under.
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Base URL peers use to reach this node. Derived from `server` when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Deadline for a query forwarded to a peer.
    #[serde(default = "default_forward_timeout_seconds")]
    pub forward_timeout_seconds: u64,

    /// How often this node refreshes its own heartbeat. 0 disables the task.
    #[serde(default = "default_heartbeat_interval_seconds")]
    pub heartbeat_interval_seconds: u64,

    /// Nodes registered at startup.
    #[serde(default)]
    pub peers: Vec<PeerConfig>,
}

/// A statically configured peer node.
#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub endpoint: String,
    pub agents: BTreeSet<AgentType>,
    #[serde(default)]
    pub certificate_fingerprint: Option<String>,
}

impl From<PeerConfig> for NodeRegistration {
    fn from(peer: PeerConfig) -> Self {
        NodeRegistration {
            id: peer.id,
            node_type: peer.node_type,
            endpoint: peer.endpoint,
            agents: peer.agents,
            certificate_fingerprint: peer.certificate_fingerprint,
        }
    }
}

/// Cross-verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Time one verifier gets for its check and its own answer.
    #[serde(default = "default_verifier_timeout_seconds")]
    pub verifier_timeout_seconds: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_node_id() -> String {
    "cloud".to_string()
}

fn default_forward_timeout_seconds() -> u64 {
    30
}

fn default_heartbeat_interval_seconds() -> u64 {
    60
}

fn default_verifier_timeout_seconds() -> u64 {
    90
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            endpoint: None,
            forward_timeout_seconds: default_forward_timeout_seconds(),
            heartbeat_interval_seconds: default_heartbeat_interval_seconds(),
            peers: Vec::new(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            verifier_timeout_seconds: default_verifier_timeout_seconds(),
        }
    }
}

impl Config {
    /// The URL this node advertises for itself.
    pub fn public_endpoint(&self) -> String {
        match &self.federation.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.clone(),
            _ => format!("http://{}:{}", self.server.host, self.server.port),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`apply_env_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies overrides looked up by `var`:
/// - `VERDANT_HOST` overrides `server.host`
/// - `VERDANT_PORT` overrides `server.port`
/// - `VERDANT_LOG_LEVEL` overrides `logging.level`
/// - `VERDANT_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `VERDANT_LLM_BASE_URL` overrides `llm.base_url`
/// - `VERDANT_LLM_API_KEY`, else `OPENAI_API_KEY`, overrides `llm.api_key`
/// - `VERDANT_LLM_MODEL` overrides `llm.model`
/// - `VERDANT_LLM_TIMEOUT_SECONDS` overrides `llm.timeout_seconds`
/// - `VERDANT_NODE_ID` overrides `federation.node_id`
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(parsed) = var("VERDANT_HOST").and_then(|v| v.parse().ok()) {
        config.server.host = parsed;
    }
    if let Some(parsed) = var("VERDANT_PORT").and_then(|v| v.parse().ok()) {
        config.server.port = parsed;
    }
    if let Some(level) = var("VERDANT_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("VERDANT_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(base_url) = var("VERDANT_LLM_BASE_URL") {
        config.llm.base_url = base_url;
    }
    if let Some(api_key) = var("VERDANT_LLM_API_KEY").or_else(|| var("OPENAI_API_KEY")) {
        config.llm.api_key = api_key;
    }
    if let Some(model) = var("VERDANT_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(parsed) = var("VERDANT_LLM_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
        config.llm.timeout_seconds = parsed;
    }
    if let Some(node_id) = var("VERDANT_NODE_ID").filter(|v| !v.trim().is_empty()) {
        config.federation.node_id = node_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.timeout_seconds, 60);
        assert_eq!(config.federation.node_id, "cloud");
        assert_eq!(config.federation.forward_timeout_seconds, 30);
        assert_eq!(config.federation.heartbeat_interval_seconds, 60);
        assert_eq!(config.verification.verifier_timeout_seconds, 90);
        assert_eq!(config.public_endpoint(), "http://127.0.0.1:3000");
    }

    #[test]
    fn missing_file_means_defaults() {
        let config = load_config(Some("/nonexistent/verdant.toml")).unwrap();
        assert_eq!(config.federation.node_id, "cloud");
    }

    #[test]
    fn parses_file_with_peers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 8080

[llm]
model = "gpt-4o-mini"

[federation]
node_id = "hq"
endpoint = "https://hq.verdant.example"

[[federation.peers]]
id = "store-1"
type = "local"
endpoint = "http://10.0.0.5:3000"
agents = ["compliance", "customer-success"]
certificate_fingerprint = "abc123"
"#
        )
        .unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.federation.node_id, "hq");
        assert_eq!(config.public_endpoint(), "https://hq.verdant.example");

        let peer: NodeRegistration = config.federation.peers[0].clone().into();
        assert_eq!(peer.id.as_deref(), Some("store-1"));
        assert_eq!(peer.node_type, NodeType::Local);
        assert!(peer.agents.contains(&AgentType::CustomerSuccess));
        assert_eq!(peer.certificate_fingerprint.as_deref(), Some("abc123"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nport = ").unwrap();
        assert!(matches!(
            load_config(file.path().to_str()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("VERDANT_HOST", "0.0.0.0"),
                ("VERDANT_PORT", "9000"),
                ("VERDANT_LOG_JSON", "1"),
                ("VERDANT_LLM_MODEL", "gpt-4.1"),
                ("VERDANT_LLM_TIMEOUT_SECONDS", "15"),
                ("VERDANT_NODE_ID", "store-9"),
            ]),
        );
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert!(config.logging.json);
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.timeout_seconds, 15);
        assert_eq!(config.federation.node_id, "store-9");
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env(&[("VERDANT_PORT", "not-a-port"), ("VERDANT_NODE_ID", " ")]),
        );
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.federation.node_id, "cloud");
    }

    #[test]
    fn api_key_prefers_verdant_variable() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, env(&[("OPENAI_API_KEY", "sk-openai")]));
        assert_eq!(config.llm.api_key, "sk-openai");

        apply_env_overrides(
            &mut config,
            env(&[("OPENAI_API_KEY", "sk-openai"), ("VERDANT_LLM_API_KEY", "sk-verdant")]),
        );
        assert_eq!(config.llm.api_key, "sk-verdant");
        assert!(!format!("{:?}", config).contains("sk-verdant"));
    }
}
