use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers::{
    health_handler, links_handler, method_not_allowed_handler, not_found_handler,
    preflight_handler, webhook_handler,
};
use crate::routes;
use crate::state::AppState;

/// Public read endpoint: simple GETs from any origin
fn links_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Webhook endpoint: POSTs carrying a bearer token
fn webhook_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health_handler))
        .route(
            routes::LINKS,
            get(links_handler)
                .options(preflight_handler)
                .layer(links_cors()),
        )
        .route(
            routes::WEBHOOK,
            post(webhook_handler)
                .options(preflight_handler)
                .layer(webhook_cors()),
        )
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        // replaces only default fallbacks; OPTIONS stays on the layered endpoints above
        .method_not_allowed_fallback(method_not_allowed_handler)
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
