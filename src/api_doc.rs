use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{Document, Link, WebhookRequest, WebhookResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "navlinks-kv API",
        version = "1.0.0",
        description = "A navigation links document kept in a key-value store, with a bearer-authenticated webhook for edits"
    ),
    paths(
        handlers::health::health_handler,
        handlers::links::links_handler,
        handlers::webhook::webhook_handler
    ),
    components(
        schemas(
            Link,
            Document,
            WebhookRequest,
            WebhookResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "links", description = "Links document operations")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by the webhook path
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
