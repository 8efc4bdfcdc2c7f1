//! Router-level tests for `POST /api/chat` using a fake provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chatmeter::config::UpstreamConfig;
use chatmeter::llm::{Completion, CompletionRequest, LLMError, LLMProvider, TokenUsage};
use chatmeter::pricing::Pricing;
use chatmeter::server::{AppState, build_app};
use chatmeter_types::{ChatMessage, Role};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

// ============================================================================
// Fake provider
// ============================================================================

enum Behavior {
    Reply(Completion),
    Fail { status: u16, message: String },
}

struct FakeProvider {
    behavior: Behavior,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    fn replying(text: &str, input_tokens: u32, output_tokens: u32) -> Arc<Self> {
        Arc::new(Self {
            behavior: Behavior::Reply(Completion {
                text: text.to_string(),
                usage: TokenUsage {
                    input_tokens,
                    output_tokens,
                },
            }),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: Behavior::Fail {
                status,
                message: message.to_string(),
            },
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl LLMProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match &self.behavior {
            Behavior::Reply(completion) => Ok(completion.clone()),
            Behavior::Fail { status, message } => Err(LLMError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app_with(provider: Option<Arc<dyn LLMProvider>>) -> Router {
    let state = AppState {
        provider,
        upstream: Arc::new(UpstreamConfig::default()),
        pricing: Pricing::default(),
    };
    build_app(state, 30)
}

async fn post_chat(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn multi_turn_request_returns_message_and_usage() {
    let fake = FakeProvider::replying("Hello there!", 1_000_000, 2_000);
    let app = app_with(Some(fake.clone()));

    let body = json!({
        "messages": [
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello"},
            {"role": "user", "content": "how are you?"}
        ]
    });
    let (status, json) = post_chat(app, &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "message": "Hello there!",
            "usage": {
                "input_tokens": 1_000_000,
                "output_tokens": 2_000,
                "input_cost": "3.000000",
                "output_cost": "0.030000",
                "total_cost": "3.030000"
            }
        })
    );

    assert_eq!(fake.calls(), 1);
    let sent = fake.last_request();
    assert_eq!(sent.model, "claude-3-5-haiku-20241022");
    assert_eq!(sent.max_tokens, 1024);
    assert_eq!(
        sent.messages,
        vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("how are you?"),
        ]
    );
}

#[tokio::test]
async fn single_message_request_is_still_accepted() {
    let fake = FakeProvider::replying("pong", 0, 0);
    let app = app_with(Some(fake.clone()));

    let (status, json) = post_chat(app, r#"{"message":"ping"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "pong");
    assert_eq!(json["usage"]["input_cost"], "0.000000");
    assert_eq!(json["usage"]["output_cost"], "0.000000");
    assert_eq!(json["usage"]["total_cost"], "0.000000");

    let sent = fake.last_request();
    assert_eq!(sent.messages.len(), 1);
    assert_eq!(sent.messages[0].role, Role::User);
    assert_eq!(sent.messages[0].content, "ping");
}

#[tokio::test]
async fn missing_api_key_returns_500_without_calling_upstream() {
    let app = app_with(None);

    let (status, json) = post_chat(app, r#"{"messages":[{"role":"user","content":"hi"}]}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Anthropic API key is not configured"}));
}

#[tokio::test]
async fn upstream_error_surfaces_provider_message_as_500() {
    let fake = FakeProvider::failing(529, "Overloaded");
    let app = app_with(Some(fake.clone()));

    let (status, json) = post_chat(app, r#"{"messages":[{"role":"user","content":"hi"}]}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({"error": "Anthropic API error: Overloaded"}));
    assert!(json.get("usage").is_none());
    assert_eq!(fake.calls(), 1);
}

#[tokio::test]
async fn upstream_client_error_status_is_not_forwarded() {
    let fake = FakeProvider::failing(401, "invalid x-api-key");
    let app = app_with(Some(fake));

    let (status, json) = post_chat(app, r#"{"message":"hi"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Anthropic API error: invalid x-api-key");
}

#[tokio::test]
async fn malformed_body_is_rejected_without_upstream_call() {
    let fake = FakeProvider::replying("unused", 1, 1);
    let app = app_with(Some(fake.clone()));

    let (status, json) = post_chat(app.clone(), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, json) = post_chat(app, r#"{"prompt":"hi"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn empty_conversation_is_rejected() {
    let fake = FakeProvider::replying("unused", 1, 1);
    let app = app_with(Some(fake.clone()));

    let (status, json) = post_chat(app, r#"{"messages":[]}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "conversation must contain at least one message"
    );
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn health_and_version_endpoints() {
    let app = app_with(None);

    let response = app
        .clone()
        .oneshot(Request::get("/livez").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"api key not configured");

    let response = app
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn readyz_is_ok_once_a_provider_is_configured() {
    let fake = FakeProvider::replying("unused", 0, 0);
    let app = app_with(Some(fake.clone()));

    let response = app
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fake.calls(), 0);
}
