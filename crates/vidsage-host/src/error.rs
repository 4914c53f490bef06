use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use vidsage_client::GatewayError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway(e) => match e {
                GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
                GatewayError::Configuration => StatusCode::SERVICE_UNAVAILABLE,
                GatewayError::Transport(_)
                | GatewayError::Protocol { .. }
                | GatewayError::Application(_)
                | GatewayError::MissingVideoId
                | GatewayError::InvalidResponse(_)
                | GatewayError::Stream(_) => StatusCode::BAD_GATEWAY,
                GatewayError::Storage(_) | GatewayError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (
                GatewayError::Validation("Invalid YouTube URL".to_string()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (GatewayError::Configuration.into(), StatusCode::SERVICE_UNAVAILABLE),
            (
                GatewayError::Protocol {
                    status: 404,
                    message: "gone".to_string(),
                }
                .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (GatewayError::MissingVideoId.into(), StatusCode::BAD_GATEWAY),
            (
                GatewayError::Internal("boom".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{}", error);
        }
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let response = ApiError::from(GatewayError::Configuration).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"error": "Backend URL not configured"}));
    }
}
