// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const LINKS: &str = "/api/links";
pub const WEBHOOK: &str = "/api/webhook";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI: &str = "/swagger-ui";
