use crate::error::FederationError;
use std::time::Duration;
use tracing::debug;
use verdant_types::{AgentResponse, FederatedNode, FederationRequest};

/// Header carrying the forwarding node's id.
pub const SOURCE_NODE_HEADER: &str = "x-source-node";

/// Header carrying the target node's stored certificate fingerprint.
pub const CERTIFICATE_FINGERPRINT_HEADER: &str = "x-certificate-fingerprint";

/// Forwards queries to peer nodes over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    source_node: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(source_node: impl Into<String>, timeout: Duration) -> Result<Self, FederationError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            source_node: source_node.into(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// POSTs `request` to `{node.endpoint}/api/federation/query` and decodes
    /// the peer's [`AgentResponse`].
    pub async fn forward(
        &self,
        node: &FederatedNode,
        request: &FederationRequest,
    ) -> Result<AgentResponse, FederationError> {
        let url = format!(
            "{}/api/federation/query",
            node.endpoint.trim_end_matches('/')
        );
        debug!(node_id = %node.id, %url, "forwarding query");

        let mut builder = self
            .client
            .post(&url)
            .header(SOURCE_NODE_HEADER, &self.source_node)
            .json(request);
        if let Some(fingerprint) = &node.certificate_fingerprint {
            builder = builder.header(CERTIFICATE_FINGERPRINT_HEADER, fingerprint);
        }

        let exchange = async {
            let resp = builder.send().await?;
            if !resp.status().is_success() {
                return Err(FederationError::RemoteStatus {
                    node_id: node.id.clone(),
                    status: resp.status().to_string(),
                });
            }
            Ok(resp.json::<AgentResponse>().await?)
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| FederationError::Timeout {
                node_id: node.id.clone(),
                timeout: self.timeout,
            })?
    }
}
