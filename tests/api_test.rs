use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header::CONTENT_TYPE},
    routing::get,
};
use chat_relay::{
    apply_middleware, build_router, config::Args, rate_limit::RateLimiter, state::AppState,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn configured_args(server: &MockServer) -> Args {
    Args {
        api_key: Some("test-key".to_string()),
        api_url: format!("{}/generate", server.uri()),
        retry_base_delay_ms: 5,
        ..Args::default()
    }
}

fn app(args: &Args) -> Router {
    build_router(Arc::new(AppState::from_args(args).unwrap()))
}

fn app_with_limit(args: &Args, max_requests: usize) -> Router {
    let limiter = RateLimiter::new(max_requests, Duration::from_secs(60));
    build_router(Arc::new(AppState::with_rate_limiter(args, limiter).unwrap()))
}

async fn mock_upstream(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })))
        .mount(&server)
        .await;
    server
}

fn post_json(path: &str, body: Value, peer: [u8; 4]) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40000))));
    req
}

fn get_req(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

const CLIENT: [u8; 4] = [10, 0, 0, 1];

#[tokio::test]
async fn health_reports_missing_key() {
    let (status, body) = send(&app(&Args::default()), get_req("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["api_configured"], false);
    assert!(body["timestamp"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn health_ignores_rate_limit_state() {
    let server = mock_upstream("hi").await;
    let app = app_with_limit(&configured_args(&server), 1);

    let (status, _) = send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, body) = send(&app, get_req("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_configured"], true);
}

#[tokio::test]
async fn chat_rejects_empty_and_oversized_messages() {
    let server = mock_upstream("unused").await;
    let app = app(&configured_args(&server));

    let (status, body) = send(&app, post_json("/api/chat", json!({"message": ""}), CLIENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid request", "message": "Message cannot be empty"}));

    let long = "x".repeat(1001);
    let (status, body) = send(&app, post_json("/api/chat", json!({"message": long}), CLIENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message too long");

    let (status, body) = send(&app, post_json("/api/chat", json!({"text": "hi"}), CLIENT)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing message field");

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn chat_returns_sanitized_upstream_text() {
    let server = mock_upstream("## Answer\n\n\n\n**Bold** and `code`\n").await;
    let app = app(&configured_args(&server));

    let message = "m".repeat(500);
    let (status, body) = send(&app, post_json("/api/chat", json!({"message": message}), CLIENT)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Answer\n\nBold and code");
    assert!(body["timestamp"].as_f64().unwrap() > 0.0);
    assert!(body.get("streaming").is_none());
}

#[tokio::test]
async fn chat_stream_is_marked_non_streaming() {
    let server = mock_upstream("*hello*").await;
    let app = app(&configured_args(&server));

    let (status, body) =
        send(&app, post_json("/api/chat/stream", json!({"message": "hi"}), CLIENT)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "hello");
    assert_eq!(body["streaming"], false);
}

#[tokio::test]
async fn chat_without_api_key_is_a_configuration_error() {
    let app = app(&Args::default());

    let (status, body) = send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Configuration error", "message": "API key not configured"}));
}

#[tokio::test]
async fn upstream_failure_surfaces_its_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&configured_args(&server));

    let (status, body) = send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["message"], "Invalid API key configuration.");
}

#[tokio::test]
async fn rate_limit_is_per_client() {
    let server = mock_upstream("ok").await;
    let app = app_with_limit(&configured_args(&server), 2);

    for _ in 0..2 {
        let (status, _) = send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, post_json("/api/chat/stream", json!({"message": "hi"}), CLIENT)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({"error": "Rate limit exceeded", "message": "Maximum 2 requests per 60 seconds"})
    );

    let other = [10, 0, 0, 2];
    let (status, _) = send(&app, post_json("/api/chat", json!({"message": "hi"}), other)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn config_describes_limits_and_features() {
    let (status, body) = send(&app(&Args::default()), get_req("/api/config")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "max_message_length": 1000,
            "rate_limit": {"requests": 60, "window": 60},
            "features": {"streaming": false, "file_upload": false, "image_generation": false}
        })
    );
}

#[tokio::test]
async fn unknown_route_is_structured_404() {
    let (status, body) = send(&app(&Args::default()), get_req("/api/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    assert_eq!(body["message"], "The requested endpoint does not exist");
}

async fn boom() -> &'static str {
    panic!("kaboom")
}

#[tokio::test]
async fn panics_become_generic_500() {
    let app = apply_middleware(Router::new().route("/boom", get(boom)), false);

    let (status, body) = send(&app, get_req("/boom")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Internal server error", "message": "An unexpected error occurred"})
    );
}

#[tokio::test]
async fn development_mode_exposes_panic_detail() {
    let app = apply_middleware(Router::new().route("/boom", get(boom)), true);

    let (status, body) = send(&app, get_req("/boom")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "kaboom");
}

#[tokio::test]
async fn metrics_are_exposed() {
    let server = mock_upstream("ok").await;
    let app = app(&configured_args(&server));
    send(&app, post_json("/api/chat", json!({"message": "hi"}), CLIENT)).await;

    let res = app.clone().oneshot(get_req("/metrics")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = String::from_utf8(res.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap();
    assert!(text.contains("relay_chat_requests_total"));
    assert!(text.contains("relay_rate_limit_clients"));
}
