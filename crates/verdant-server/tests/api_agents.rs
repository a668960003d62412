mod common;

use axum::http::StatusCode;
use common::{all_agents_state, body_json, get, post_json, FAIL_MARKER};
use serde_json::json;
use tower::ServiceExt;
use verdant_server::app;

#[tokio::test]
async fn test_health_check_returns_ok() {
    let response = app(all_agents_state()).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_lists_loaded_agents() {
    let response = app(all_agents_state()).oneshot(get("/api/agents")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let agents = json.as_array().unwrap();
    assert_eq!(agents.len(), 9);
    assert!(agents.contains(&json!("customer-success")));
}

#[tokio::test]
async fn test_compliance_query_is_answered() {
    let response = app(all_agents_state())
        .oneshot(post_json(
            "/api/agents/compliance/query",
            json!({ "query": "Do gummies need child-resistant packaging?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["agent"], "compliance");
    assert_eq!(json["response"], "answer from cloud");
    // 80 plus one cited source
    assert_eq!(json["confidence"], 85);
    assert_eq!(json["requiresHumanVerification"], false);
    assert_eq!(json["metadata"]["riskLevel"], "low");
}

#[tokio::test]
async fn test_unknown_agent_type_is_not_found() {
    let response = app(all_agents_state())
        .oneshot(post_json(
            "/api/agents/astrology/query",
            json!({ "query": "Will sales go up?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "unknown agent type: astrology");
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let response = app(all_agents_state())
        .oneshot(post_json("/api/agents/marketing/query", json!({ "query": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "query must not be empty");
}

#[tokio::test]
async fn test_model_failure_degrades_instead_of_erroring() {
    let response = app(all_agents_state())
        .oneshot(post_json(
            "/api/agents/sourcing/query",
            json!({ "query": format!("Find hemp suppliers {}", FAIL_MARKER) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["agent"], "sourcing");
    assert_eq!(json["confidence"], 0);
    assert_eq!(json["requiresHumanVerification"], true);
}
