//! Integration tests for the Texty API endpoints.
//!
//! Most tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic, routing, and the
//! SSE stream without needing a live network connection. The `WebSocket`
//! tests bind a loopback listener, since an upgrade needs a real
//! connection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::StreamExt as _;
use serde_json::{json, Value};
use texty_core::ServiceConfig;
use texty_server::router::build_router;
use texty_server::state::AppState;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

fn make_router() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::default());
    (build_router(Arc::clone(&state)), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn get_text(router: &Router) -> Value {
    let (status, json) = send(router, Request::get("/text").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    json
}

/// Reads SSE frames until one complete event (terminated by a blank
/// line) is available and returns its `data` payload as JSON.
async fn next_event<S>(stream: &mut S, buffer: &mut String) -> Value
where
    S: futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
{
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let event: String = buffer.drain(..end + 2).collect();
            if !event.contains("event: update") {
                continue;
            }
            let data = event
                .lines()
                .find_map(|line| line.strip_prefix("data: "))
                .expect("event without data line");
            return serde_json::from_str(data).unwrap();
        }
        let chunk = tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for SSE event")
            .expect("SSE stream ended")
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

// =========================================================================
// REST
// =========================================================================

#[tokio::test]
async fn test_initial_state_is_empty() {
    let (router, _) = make_router();
    assert_eq!(get_text(&router).await, json!({ "text": "", "lockHolder": "" }));
}

#[tokio::test]
async fn test_lock_scenario_between_two_clients() {
    let (router, _) = make_router();

    let (status, body) = send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(&router, post_json("/lock", &json!({ "userId": "B" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "lock is owned by another user");

    let (status, _) = send(
        &router,
        post_json("/text", &json!({ "userId": "A", "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(get_text(&router).await["text"], "hello");

    let (status, body) = send(
        &router,
        post_json("/text", &json!({ "userId": "B", "text": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
    assert_eq!(get_text(&router).await["text"], "hello");

    let (status, _) = send(&router, post_json("/unlock", &json!({ "userId": "A" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, post_json("/lock", &json!({ "userId": "B" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        get_text(&router).await,
        json!({ "text": "hello", "lockHolder": "B" })
    );
}

#[tokio::test]
async fn test_reacquire_by_holder_succeeds() {
    let (router, _) = make_router();
    for _ in 0..3 {
        let (status, _) = send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(get_text(&router).await["lockHolder"], "A");
}

#[tokio::test]
async fn test_missing_user_id_is_bad_request() {
    let (router, _) = make_router();

    let (status, body) = send(&router, post_json("/lock", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no identifier provided");

    let (status, _) = send(&router, post_json("/unlock", &json!({ "userId": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_release_by_non_owner_is_forbidden() {
    let (router, _) = make_router();
    send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;

    let (status, _) = send(&router, post_json("/unlock", &json!({ "userId": "B" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(get_text(&router).await["lockHolder"], "A");
}

#[tokio::test]
async fn test_write_without_lock_is_forbidden() {
    let (router, _) = make_router();
    let (status, _) = send(
        &router,
        post_json("/text", &json!({ "userId": "A", "text": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(get_text(&router).await["text"], "");
}

#[tokio::test]
async fn test_missing_text_writes_empty_string() {
    let (router, _) = make_router();
    send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    send(
        &router,
        post_json("/text", &json!({ "userId": "A", "text": "draft" })),
    )
    .await;

    let (status, _) = send(&router, post_json("/text", &json!({ "userId": "A" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(get_text(&router).await["text"], "");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (router, _) = make_router();
    let request = Request::post("/lock")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_root_redirects_to_frontend() {
    let (router, state) = make_router();
    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get(header::LOCATION).unwrap();
    assert_eq!(location.to_str().unwrap(), state.frontend_url);
}

#[tokio::test]
async fn test_hello_returns_greeting() {
    let (router, _) = make_router();
    let response = router
        .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Hello, Texty.");
}

#[tokio::test]
async fn test_cors_preflight_is_answered() {
    let (router, _) = make_router();
    let request = Request::options("/text")
        .header(header::ORIGIN, "http://localhost:8788")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .unwrap();
    assert_eq!(allow_origin, "*");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let (router, _) = make_router();
    let response = router
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// SSE
// =========================================================================

#[tokio::test]
async fn test_subscribe_streams_initial_snapshot_then_changes() {
    let (router, state) = make_router();

    let response = router
        .clone()
        .oneshot(Request::get("/subscribe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    let mut stream = Box::pin(response.into_body().into_data_stream());
    let mut buffer = String::new();

    assert_eq!(
        next_event(&mut stream, &mut buffer).await,
        json!({ "text": "", "lockHolder": "" })
    );
    assert_eq!(state.coordinator.subscriber_count(), 1);

    send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    send(
        &router,
        post_json("/text", &json!({ "userId": "A", "text": "hi" })),
    )
    .await;

    assert_eq!(
        next_event(&mut stream, &mut buffer).await,
        json!({ "text": "", "lockHolder": "A" })
    );
    assert_eq!(
        next_event(&mut stream, &mut buffer).await,
        json!({ "text": "hi", "lockHolder": "A" })
    );
}

#[tokio::test]
async fn test_dropping_stream_unregisters_subscriber() {
    let (router, state) = make_router();

    let response = router
        .clone()
        .oneshot(Request::get("/subscribe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(state.coordinator.subscriber_count(), 1);

    drop(response);
    assert_eq!(state.coordinator.subscriber_count(), 0);

    // Mutations after the disconnect reach nobody and still succeed.
    let (status, _) = send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_operations_push_nothing() {
    let (router, _) = make_router();
    send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;

    let response = router
        .clone()
        .oneshot(Request::get("/subscribe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut stream = Box::pin(response.into_body().into_data_stream());
    let mut buffer = String::new();
    assert_eq!(
        next_event(&mut stream, &mut buffer).await,
        json!({ "text": "", "lockHolder": "A" })
    );

    send(&router, post_json("/lock", &json!({ "userId": "B" }))).await;
    send(
        &router,
        post_json("/text", &json!({ "userId": "B", "text": "x" })),
    )
    .await;
    send(&router, post_json("/unlock", &json!({ "userId": "A" }))).await;

    // The only event after the initial one is A's release.
    assert_eq!(
        next_event(&mut stream, &mut buffer).await,
        json!({ "text": "", "lockHolder": "" })
    );
}

#[tokio::test]
async fn test_idle_stream_sends_keep_alive_comments() {
    let mut config = ServiceConfig::default();
    config.subscribers.keep_alive_secs = 1;
    let state = Arc::new(AppState::new(&config));
    let router = build_router(Arc::clone(&state));

    let response = router
        .oneshot(Request::get("/subscribe").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut stream = Box::pin(response.into_body().into_data_stream());
    let mut buffer = String::new();
    next_event(&mut stream, &mut buffer).await;

    // Nothing is committed, so the next frame is a keep-alive comment.
    while !buffer.lines().any(|line| line.starts_with(':')) {
        let chunk = tokio::time::timeout(Duration::from_secs(3), stream.next())
            .await
            .expect("timed out waiting for keep-alive")
            .expect("SSE stream ended")
            .unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
    assert!(!buffer.contains("event: update"));
}

// =========================================================================
// WebSocket
// =========================================================================

/// Serve `router` on an ephemeral loopback port and return its address.
async fn spawn_server(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Reads frames until a text frame arrives and returns it as JSON.
async fn next_frame<S>(socket: &mut S) -> Value
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for WebSocket frame")
            .expect("WebSocket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn wait_for_subscribers(state: &AppState, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.coordinator.subscriber_count() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never settled");
}

#[tokio::test]
async fn test_ws_streams_initial_snapshot_then_changes() {
    let (router, state) = make_router();
    let addr = spawn_server(router.clone()).await;

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();

    assert_eq!(
        next_frame(&mut socket).await,
        json!({ "text": "", "lockHolder": "" })
    );
    assert_eq!(state.coordinator.subscriber_count(), 1);

    send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    send(
        &router,
        post_json("/text", &json!({ "userId": "A", "text": "hi" })),
    )
    .await;

    assert_eq!(
        next_frame(&mut socket).await,
        json!({ "text": "", "lockHolder": "A" })
    );
    assert_eq!(
        next_frame(&mut socket).await,
        json!({ "text": "hi", "lockHolder": "A" })
    );

    socket.close(None).await.unwrap();
    wait_for_subscribers(&state, 0).await;
}

#[tokio::test]
async fn test_ws_client_drop_unregisters_subscriber() {
    let (router, state) = make_router();
    let addr = spawn_server(router.clone()).await;

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    next_frame(&mut socket).await;
    assert_eq!(state.coordinator.subscriber_count(), 1);

    drop(socket);
    wait_for_subscribers(&state, 0).await;

    let (status, _) = send(&router, post_json("/lock", &json!({ "userId": "A" }))).await;
    assert_eq!(status, StatusCode::OK);
}
