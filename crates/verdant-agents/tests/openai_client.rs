use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use verdant_agents::{
    Agent, AgentError, CompletionClient, DomainAgent, LlmConfig, OpenAiClient,
};
use verdant_types::AgentType;

/// Fake `/chat/completions` endpoint: echoes the requested response format
/// back inside a canned agent answer, and rejects a bad bearer token.
async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != "Bearer test-key" {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let answer = json!({
        "response": format!("model={}", body["model"].as_str().unwrap_or_default()),
        "confidence": 91,
        "sources": [],
        "requiresHumanVerification": false,
        "jsonMode": (body["response_format"]["type"] == "json_object"),
        "compounds": ["THC", "CBD"],
        "contaminants": [],
        "method": "HPLC"
    });

    Ok(Json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": answer.to_string() },
            "finish_reason": "stop"
        }]
    })))
}

async fn spawn_fake_llm() -> String {
    let app = Router::new().route("/v1/chat/completions", post(chat_completions));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

#[tokio::test]
async fn test_complete_requests_json_mode() {
    let base_url = spawn_fake_llm().await;
    let client = OpenAiClient::new(LlmConfig::new(&base_url, "test-key")).unwrap();

    let text = client.complete("Interpret this COA", true).await.unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["jsonMode"], true);
    assert_eq!(parsed["response"], "model=gpt-4o");

    let text = client.complete("Interpret this COA", false).await.unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["jsonMode"], false);
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let base_url = spawn_fake_llm().await;
    let client = OpenAiClient::new(LlmConfig::new(&base_url, "wrong-key")).unwrap();

    match client.complete("hello", true).await {
        Err(AgentError::Remote { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_spectra_agent_end_to_end() {
    let base_url = spawn_fake_llm().await;
    let client = OpenAiClient::new(LlmConfig::new(format!("{}/", base_url), "test-key")).unwrap();
    let agent = DomainAgent::new(AgentType::Spectra, Arc::new(client));

    let outcome = agent
        .process_query("What does this HPLC trace show?", None)
        .await;
    assert!(outcome.is_answered());
    let response = outcome.into_response();
    assert_eq!(response.agent, AgentType::Spectra);
    assert_eq!(response.confidence, 91);
    assert_eq!(response.metadata["method"], "HPLC");
    assert!(!response.requires_human_verification);
}

#[tokio::test]
async fn test_unreachable_endpoint_degrades() {
    // Bind then drop to obtain a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OpenAiClient::new(LlmConfig::new(format!("http://{}/v1", addr), "test-key"))
        .unwrap();
    let agent = DomainAgent::new(AgentType::Sourcing, Arc::new(client));

    let outcome = agent.process_query("Find a COA lab in Denver", None).await;
    assert!(!outcome.is_answered());
    let response = outcome.into_response();
    assert_eq!(response.confidence, 0);
    assert!(response.requires_human_verification);
}
