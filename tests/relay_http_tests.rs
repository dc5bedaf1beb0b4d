//! Relay HTTP surface: routing, validation, upstream handling and the HTTP client.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swasthya::application::{
    ChatClient, RelayClient, DEGRADED_REPLY, MISCONFIGURED_REPLY, SYSTEM_PROMPT,
};
use swasthya::connector::http::{build, serve_with_shutdown, RelayState, MESSAGE_REQUIRED};
use swasthya::{
    AIAnalysis, HealthAnalysisUseCase, HttpRelayClient, MockChatClient, OpenRouterClient,
    RelayRequest,
};

fn state_with(client: Option<Arc<dyn ChatClient>>) -> Arc<RelayState> {
    Arc::new(RelayState {
        analysis: Arc::new(HealthAnalysisUseCase::new(client)),
    })
}

async fn post_chat(state: Arc<RelayState>, body: &str) -> (StatusCode, Value) {
    let response = build(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn chat_rejects_missing_or_empty_message() {
    let client = Arc::new(MockChatClient::new());
    let state = state_with(Some(client.clone()));

    for body in [
        "{}",
        r#"{"message": ""}"#,
        r#"{"message": null}"#,
        "not json",
        r#"{"message": 5}"#,
    ] {
        let (status, json) = post_chat(state.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(json, json!({ "error": MESSAGE_REQUIRED }));
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn chat_accepts_whitespace_only_message() {
    let client = Arc::new(MockChatClient::new());
    let (status, json) = post_chat(
        state_with(Some(client.clone())),
        r#"{"message": "   "}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!json["reply"].as_str().unwrap_or("").is_empty());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn chat_without_credential_reports_misconfiguration() {
    let (status, json) = post_chat(state_with(None), r#"{"message": "hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], MISCONFIGURED_REPLY);
    assert!(json.get("analysis").is_none());
}

#[tokio::test]
async fn chat_success_carries_baseline_analysis() {
    let client = Arc::new(MockChatClient::new());
    let (status, json) = post_chat(
        state_with(Some(client.clone())),
        r#"{"message": "I have a headache"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["reply"].as_str().unwrap().contains("headache"));
    let analysis: AIAnalysis = serde_json::from_value(json["analysis"].clone()).unwrap();
    assert_eq!(analysis, AIAnalysis::baseline());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn chat_upstream_failure_is_degraded_not_an_error() {
    let (status, json) = post_chat(
        state_with(Some(Arc::new(MockChatClient::failing()))),
        r#"{"message": "fever"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], DEGRADED_REPLY);
    assert_eq!(json["analysis"]["diagnosis"], "unknown");
    assert_eq!(json["analysis"]["remedies"], json!([]));
}

#[tokio::test]
async fn health_and_banner_respond() {
    let app = build(state_with(None));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/chat"));
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    let response = build(state_with(None))
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/chat")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn openrouter_client_sends_bearer_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header_eq("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": "I have a headache" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": " Rest well. " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new("test-key", "gpt-4o-mini", server.uri(), None)
        .expect("client");
    let analysis = HealthAnalysisUseCase::new(Some(Arc::new(client)));

    let response = analysis.analyze("I have a headache").await.expect("analyze");
    assert_eq!(response.reply, "Rest well.");
    assert_eq!(response.analysis, Some(AIAnalysis::baseline()));
}

#[tokio::test]
async fn openrouter_error_status_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = OpenRouterClient::new("test-key", "gpt-4o-mini", server.uri(), None)
        .expect("client");
    assert!(client
        .complete(SYSTEM_PROMPT, "hi")
        .await
        .expect_err("500 is an error")
        .is_upstream_error());

    let analysis = HealthAnalysisUseCase::new(Some(Arc::new(client)));
    let response = analysis.analyze("hi").await.expect("analyze");
    assert_eq!(response.reply, DEGRADED_REPLY);
    assert_eq!(response.analysis, Some(AIAnalysis::degraded()));
}

#[tokio::test]
async fn openrouter_client_honors_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({
                    "choices": [{ "message": { "content": "too late" } }]
                })),
        )
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(
        "test-key",
        "gpt-4o-mini",
        server.uri(),
        Some(Duration::from_millis(100)),
    )
    .expect("client");

    let err = client
        .complete(SYSTEM_PROMPT, "hi")
        .await
        .expect_err("slow upstream times out");
    assert!(err.is_upstream_error());
}

#[tokio::test]
async fn http_relay_client_talks_to_running_relay() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(serve_with_shutdown(
        listener,
        state_with(Some(Arc::new(MockChatClient::new()))),
        async move {
            let _ = stopped.await;
        },
    ));

    let client = HttpRelayClient::new(format!("http://{}", addr));
    let response = client
        .send(&RelayRequest::new("I have a cough"))
        .await
        .expect("relay reply");
    assert!(response.reply.contains("cough"));
    assert_eq!(response.analysis, Some(AIAnalysis::baseline()));

    let err = client
        .send(&RelayRequest::new(""))
        .await
        .expect_err("empty message is a 400");
    assert!(err.is_upstream_error());

    let _ = stop.send(());
    server.await.expect("join").expect("server result");
}
