//! Integration tests for the HTTP chat relay.
//!
//! A local axum server stands in for the chat host and records what the
//! relay posts to it.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use webhook_relay::{
    error::AppError,
    services::relay::{HttpRelay, MessageSender, SIGNATURE_HEADER, generate_signature},
};

#[derive(Debug, Clone)]
struct Captured {
    headers: HeaderMap,
    body: Bytes,
}

#[derive(Clone)]
struct CaptureState {
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
}

async fn capture(State(state): State<CaptureState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    state.captured.lock().unwrap().push(Captured { headers, body });
    state.status
}

/// Start a capture server answering with `status`; returns its URL.
async fn start_host(status: StatusCode) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().route("/messages", post(capture)).with_state(CaptureState {
        captured: captured.clone(),
        status,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("capture server");
    });

    (format!("http://{addr}/messages"), captured)
}

#[tokio::test]
async fn posts_signed_channel_message() {
    let (url, captured) = start_host(StatusCode::OK).await;
    let relay = HttpRelay::new(url, "relay-token").expect("relay client");

    relay.send_channel_message("#general", "hello").await.expect("delivered");

    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];

    let body: serde_json::Value = serde_json::from_slice(&request.body).expect("json body");
    assert_eq!(body["channel"], "#general");
    assert_eq!(body["message"], "hello");

    assert_eq!(request.headers["authorization"], "Bearer relay-token");
    assert_eq!(request.headers["content-type"], "application/json");

    let payload = std::str::from_utf8(&request.body).expect("utf-8 body");
    let expected = generate_signature("relay-token", payload).expect("signature");
    assert_eq!(request.headers[SIGNATURE_HEADER], expected.as_str());
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let (url, captured) = start_host(StatusCode::OK).await;
    let relay = HttpRelay::new(url, "").expect("relay client");

    relay.send_channel_message("#general", "hello").await.expect("delivered");

    let captured = captured.lock().unwrap();
    assert!(captured[0].headers.get("authorization").is_none());
    assert!(captured[0].headers.get(SIGNATURE_HEADER).is_some());
}

#[tokio::test]
async fn error_status_is_relay_failure() {
    let (url, captured) = start_host(StatusCode::INTERNAL_SERVER_ERROR).await;
    let relay = HttpRelay::new(url, "relay-token").expect("relay client");

    let result = relay.send_channel_message("#general", "hello").await;

    assert!(matches!(result, Err(AppError::Relay(_))));
    assert_eq!(captured.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_host_is_relay_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let relay = HttpRelay::new(format!("http://{addr}/messages"), "t").expect("relay client");
    let result = relay.send_channel_message("#general", "hello").await;

    assert!(matches!(result, Err(AppError::Relay(_))));
}
