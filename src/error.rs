use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::mutation::MutationError;

/// Error response type
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Underlying cause, present on 500 responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every failure on every endpoint ends up here and is rendered as a JSON
/// body with at least an `error` field.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or wrong bearer token
    Unauthorized,
    /// No webhook secret configured on the server
    ServerMisconfigured,
    /// Request body is not valid JSON
    JsonError(serde_json::Error),
    /// Webhook payload rejected
    Mutation(MutationError),
    /// Key-value backend read or write failed
    StorageUnavailable(anyhow::Error),
    /// No route matches the path
    NotFound(String),
    /// Route exists but not for this method
    MethodNotAllowed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::ServerMisconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server misconfigured: WEBHOOK_SECRET is not set".to_string(),
                None,
            ),
            ApiError::JsonError(err) => (
                StatusCode::BAD_REQUEST,
                format!("JSON parse error: {}", err),
                None,
            ),
            ApiError::Mutation(err) => (StatusCode::BAD_REQUEST, err.to_string(), None),
            ApiError::StorageUnavailable(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage unavailable".to_string(),
                Some(format!("{:#}", err)),
            ),
            ApiError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                format!("Not found: {}", path),
                None,
            ),
            ApiError::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                format!("Method not allowed: {}", method),
                None,
            ),
        };

        if status.is_server_error() {
            tracing::error!("{} {}: {}", status.as_u16(), error, message.as_deref().unwrap_or(""));
        } else {
            tracing::warn!("{} {}", status.as_u16(), error);
        }

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        ApiError::Mutation(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::StorageUnavailable(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::JsonError(err)
    }
}
