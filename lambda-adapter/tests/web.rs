use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hookgate::web::router;
use hookgate::{AdapterOptions, AppState, HandlerError, NoopLogger, Webhooks};

const SECRET: &str = "development-secret";
const PAYLOAD: &str = r#"{"action":"created","comment":{"id":1}}"#;

// -- Helpers --------------------------------------------------------------

fn build_app(webhooks: Webhooks) -> Router {
    let options = AdapterOptions::with_logger(Arc::new(NoopLogger));
    router(AppState::new(Arc::new(webhooks), options))
}

fn signed_delivery(event: &str, payload: &str) -> Request<Body> {
    let signature = Webhooks::new(SECRET).sign(payload);

    Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/json")
        .header("X-GitHub-Event", event)
        .header("X-Hub-Signature-256", signature)
        .header("X-GitHub-Delivery", "d2c6a7e0-0000-11ef-8000-000000000000")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let app = build_app(Webhooks::new(SECRET));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn signed_delivery_is_dispatched() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut webhooks = Webhooks::new(SECRET);
    let counter = Arc::clone(&calls);
    webhooks.on("issue_comment.created", move |event| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            assert_eq!(event.payload["comment"]["id"], 1);
            Ok(())
        }
    });

    let response = build_app(webhooks)
        .oneshot(signed_delivery("issue_comment", PAYLOAD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, "ok\n");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn non_post_is_unknown_route() {
    let response = build_app(Webhooks::new(SECRET))
        .oneshot(Request::builder().method("GET").uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body, json!({ "error": "Unknown route: GET" }));
}

#[tokio::test]
async fn form_encoded_delivery_is_unsupported() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from("payload=%7B%7D"))
        .unwrap();

    let response = build_app(Webhooks::new(SECRET)).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.headers().get("accept").unwrap(), "application/json");
}

#[tokio::test]
async fn missing_delivery_header_is_reported() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Content-Type", "application/json")
        .header("X-GitHub-Event", "push")
        .header("X-Hub-Signature-256", "sha256=abc")
        .body(Body::from("{}"))
        .unwrap();

    let response = build_app(Webhooks::new(SECRET)).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body, json!({ "error": "Required headers missing: x-github-delivery" }));
}

#[tokio::test]
async fn handler_status_is_forwarded() {
    let mut webhooks = Webhooks::new(SECRET);
    webhooks.on("issue_comment", |_event| async {
        Err(HandlerError::http(422, "comment too long"))
    });

    let response = build_app(webhooks)
        .oneshot(signed_delivery("issue_comment", PAYLOAD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&read_body(response).await).unwrap();
    assert_eq!(body, json!({ "error": "HttpError: comment too long" }));
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let response = build_app(Webhooks::new("another-secret"))
        .oneshot(signed_delivery("push", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
