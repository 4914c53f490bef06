use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Log method, path, status and latency of every request
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), latency_ms, "Request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), latency_ms, "Request rejected");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), latency_ms, "Request completed");
    }

    response
}
