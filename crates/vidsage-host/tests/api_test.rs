use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mockito::Server;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use vidsage_client::{BackendGateway, Dispatcher};
use vidsage_host::{build_router, config::CorsConfig, AppState, Config};
use vidsage_store::Storage;

async fn app(backend_url: Option<&str>) -> Router {
    let storage = Storage::builder().in_memory().build().await.unwrap();
    if let Some(url) = backend_url {
        storage.save_backend_url(url).await.unwrap();
    }
    let gateway = BackendGateway::new(storage).unwrap();
    build_router(Arc::new(AppState::new(
        Config::default(),
        Dispatcher::from_gateway(gateway),
    )))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(None)
        .await
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "vidsage-host");
    assert_eq!(json["backendConfigured"], false);
}

#[tokio::test]
async fn test_ping_command() {
    let response = app(None)
        .await
        .oneshot(post("/dispatch", json!({"action": "test"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_unknown_action_is_bad_request() {
    let response = app(None)
        .await
        .oneshot(post("/dispatch", json!({"action": "deleteEverything"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_invalid_video_url() {
    let response = app(Some("http://127.0.0.1:9"))
        .await
        .oneshot(post(
            "/dispatch",
            json!({"action": "indexVideo", "videoUrl": "not a video url"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "Invalid YouTube URL"}));
}

#[tokio::test]
async fn test_unconfigured_backend() {
    let response = app(None)
        .await
        .oneshot(post(
            "/dispatch",
            json!({"action": "analyzeVideo", "videoId": "tl_42", "type": "summary"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Backend URL not configured"})
    );
}

#[tokio::test]
async fn test_get_video_id_unknown_is_null() {
    let response = app(None)
        .await
        .oneshot(post(
            "/dispatch",
            json!({"action": "getVideoId", "videoUrl": "https://www.youtube.com/watch?v=nope"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Null);
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/health")
        .with_status(500)
        .create_async()
        .await;

    let response = app(Some(&server.url()))
        .await
        .oneshot(post("/dispatch", json!({"action": "checkBackendHealth"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Backend health check failed: 500"})
    );
}

#[tokio::test]
async fn test_stream_relays_progress_then_result() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/analyze")
        .with_status(200)
        .with_body(concat!(
            "{\"status\":\"success\",\"streaming\":true,\"video_id\":\"tl_42\"}\n",
            "{\"chunk\":\"Hello \"}\n",
            "{\"chunk\":\"world\"}\n",
            "{\"done\":true}\n",
        ))
        .create_async()
        .await;

    let response = app(Some(&server.url()))
        .await
        .oneshot(post(
            "/dispatch/stream",
            json!({"action": "analyzeVideoStream", "videoId": "tl_42", "type": "summary"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    let names: Vec<&str> = body
        .lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .collect();
    assert_eq!(
        names,
        vec![
            "processingStatusUpdate",
            "processingStatusUpdate",
            "processingStatusUpdate",
            "streamingChunk",
            "streamingChunk",
            "result",
        ]
    );

    let result: Value = body
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .last()
        .map(|data| serde_json::from_str(data).unwrap())
        .unwrap();
    assert_eq!(result["result"], "Hello world");
    assert_eq!(result["streaming"], true);
}

#[tokio::test]
async fn test_stream_ends_with_error_event() {
    let response = app(None)
        .await
        .oneshot(post(
            "/dispatch/stream",
            json!({"action": "agenticChatStream", "query": "hi"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("event: error"));
    assert!(body.contains("Backend URL not configured"));
    assert!(!body.contains("event: result"));
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/dispatch")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_cors_allows_every_listed_origin() {
    let storage = Storage::builder().in_memory().build().await.unwrap();
    let config = Config {
        cors: CorsConfig {
            enabled: true,
            origins: vec![
                "https://www.youtube.com".to_string(),
                "https://m.youtube.com".to_string(),
            ],
        },
        ..Config::default()
    };
    let app = build_router(Arc::new(AppState::new(
        config,
        Dispatcher::from_gateway(BackendGateway::new(storage).unwrap()),
    )));

    for origin in ["https://www.youtube.com", "https://m.youtube.com"] {
        let response = app.clone().oneshot(preflight(origin)).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            origin
        );
    }

    let response = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
