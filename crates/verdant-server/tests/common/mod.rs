#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use verdant_agents::{AgentError, AgentRegistry, CompletionClient, DomainAgent};
use verdant_federation::FederationManager;
use verdant_server::AppState;
use verdant_types::AgentType;
use verdant_verify::VerificationService;

/// Queries containing this marker make the fake model fail.
pub const FAIL_MARKER: &str = "[fail]";

/// Fake completion endpoint. Answers queries with every metadata field any
/// profile asks for, and agrees with every answer it is asked to verify.
pub struct ScriptedClient {
    pub label: &'static str,
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, prompt: &str, _expect_json: bool) -> Result<String, AgentError> {
        if prompt.contains(FAIL_MARKER) {
            return Err(AgentError::EmptyCompletion);
        }
        if prompt.contains("independently verifying") {
            return Ok(json!({
                "agrees": true,
                "confidence": 85,
                "discrepancies": [],
                "recommendation": "Answer is consistent with current rules"
            })
            .to_string());
        }
        Ok(json!({
            "response": format!("answer from {}", self.label),
            "confidence": 80,
            "sources": ["CCR 17304"],
            "requiresHumanVerification": false,
            "category": "packaging",
            "riskLevel": "low",
            "regulations": ["CCR 17304"],
            "recommendations": ["Use child-resistant packaging"],
            "productType": "edible",
            "ingredients": [],
            "dosage": "5mg",
            "warnings": [],
            "channels": [],
            "complianceNotes": [],
            "targetAudience": "adults 21+",
            "suppliers": [],
            "certifications": [],
            "considerations": [],
            "patents": [],
            "noveltyAssessment": "low",
            "compounds": [],
            "contaminants": [],
            "method": "HPLC",
            "issueCategory": "product",
            "nextSteps": [],
            "escalate": false,
            "area": "inventory",
            "actions": [],
            "metrics": [],
            "evidenceLevel": "moderate",
            "studies": []
        })
        .to_string())
    }
}

/// Builds state for a node called `node_id` with DomainAgents for
/// `agent_types` over a [`ScriptedClient`].
pub fn test_state(node_id: &str, label: &'static str, agent_types: &[AgentType]) -> AppState {
    let client: Arc<dyn CompletionClient> = Arc::new(ScriptedClient { label });
    let mut agents = AgentRegistry::new();
    for agent_type in agent_types {
        agents.insert(Arc::new(DomainAgent::new(*agent_type, client.clone())));
    }
    let federation = FederationManager::new(
        node_id,
        "http://127.0.0.1:3000",
        agents,
        Duration::from_secs(5),
    )
    .expect("federation manager");
    AppState::new(federation, VerificationService::new(Duration::from_secs(5)))
}

pub fn all_agents_state() -> AppState {
    test_state("cloud", "cloud", &AgentType::ALL)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Serves `app` on an ephemeral port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
