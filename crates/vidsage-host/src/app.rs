use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::CorsConfig,
    handlers::dispatch,
    middleware::logging,
    routes::health,
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/dispatch", post(dispatch::dispatch_command))
        .route("/dispatch/stream", post(dispatch::dispatch_stream))
        .layer(middleware::from_fn(logging::log_request))
        .layer(build_cors_layer(&state.config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Page scripts call the host from the video site's origin, so CORS is on by default
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    let mut cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    if config.origins.iter().any(|o| o == "*") {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors = cors.allow_origin(AllowOrigin::list(origins));
    }

    cors
}
