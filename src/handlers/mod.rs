pub mod health;
pub mod links;
pub mod webhook;

pub use health::health_handler;
pub use links::links_handler;
pub use webhook::webhook_handler;

use axum::http::{Method, StatusCode, Uri};

use crate::error::ApiError;

/// OPTIONS endpoint kept under each route's CORS layer
///
/// The CORS layer answers OPTIONS itself. Without a registered OPTIONS method
/// the router would send it to the method-not-allowed fallback, which sits
/// outside the per-route layer.
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Fallback for paths with no route
pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed_handler(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}
