//! HTTP API tests against an in-process router

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use chatstate_assistant::SessionManager;
use chatstate_core::session::{FileConversationLog, Message};
use chatstate_providers::{InferenceGateway, ProviderError, ProviderResult};
use chatstate_server::{server::build_router, state::AppState};

/// Gateway stub: fixed answer, or a failure when none is configured
struct StubGateway {
    reply: Option<String>,
}

#[async_trait]
impl InferenceGateway for StubGateway {
    async fn generate(
        &self,
        _instructions: &str,
        _history: &[Message],
        _prompt: &str,
    ) -> ProviderResult<String> {
        match &self.reply {
            Some(answer) => Ok(answer.clone()),
            None => Err(ProviderError::ApiError("model unavailable".to_string())),
        }
    }
}

fn router_with(dir: &TempDir, gateway: StubGateway) -> Router {
    let log = Arc::new(FileConversationLog::new(dir.path().join("chat_state")));
    let manager = Arc::new(SessionManager::new(log, Arc::new(gateway)));
    build_router(AppState {
        manager,
        default_instructions: "Ask for clarification if a user request is ambiguous.".to_string(),
    })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_create(assistant_id: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/chats/{}", assistant_id))
        .body(Body::empty())
        .unwrap()
}

fn post_prompt(assistant_id: &str, prompt: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/chats/{}", assistant_id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"prompt":"{}"}}"#, prompt)))
        .unwrap()
}

fn get_state(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_create_then_get_returns_no_response_sentinel() {
    let dir = TempDir::new().unwrap();
    let app = router_with(&dir, StubGateway { reply: None });

    let response = app.clone().oneshot(put_create("bot1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["assistantId"], "bot1");

    let response = app.oneshot(get_state("/chats/bot1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["answer"], "No response returned.");
    assert_eq!(json["data_points"], serde_json::json!([]));
}

#[tokio::test]
async fn test_post_and_get_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = router_with(
        &dir,
        StubGateway {
            reply: Some("4".to_string()),
        },
    );

    app.clone().oneshot(put_create("bot1")).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_prompt("bot1", "2+2?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["answer"], "4");

    let response = app.oneshot(get_state("/chats/bot1")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["answer"], "4");
}

#[tokio::test]
async fn test_duplicate_create_is_accepted() {
    let dir = TempDir::new().unwrap();
    let app = router_with(&dir, StubGateway { reply: None });

    let first = app.clone().oneshot(put_create("bot1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.oneshot(put_create("bot1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_session_maps_to_not_found() {
    let dir = TempDir::new().unwrap();
    let app = router_with(&dir, StubGateway { reply: None });

    let response = app
        .clone()
        .oneshot(post_prompt("ghost", "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_state("/chats/ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_identity_maps_to_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = router_with(&dir, StubGateway { reply: None });

    let response = app.oneshot(put_create("bad%20id")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inference_failure_maps_to_bad_gateway() {
    let dir = TempDir::new().unwrap();
    let app = router_with(&dir, StubGateway { reply: None });

    app.clone().oneshot(put_create("bot1")).await.unwrap();

    let response = app
        .clone()
        .oneshot(post_prompt("bot1", "2+2?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The prompt was recorded but never answered, so the latest answer is
    // still the sentinel
    let response = app.oneshot(get_state("/chats/bot1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["answer"], "No response returned.");
}

#[tokio::test]
async fn test_timestamp_boundary_before_history_returns_sentinel() {
    let dir = TempDir::new().unwrap();
    let app = router_with(
        &dir,
        StubGateway {
            reply: Some("4".to_string()),
        },
    );

    app.clone().oneshot(put_create("bot1")).await.unwrap();
    app.clone()
        .oneshot(post_prompt("bot1", "2+2?"))
        .await
        .unwrap();

    let response = app
        .oneshot(get_state("/chats/bot1?timestampUTC=2000-01-01T00:00:00Z"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["answer"], "No response returned.");
}
