use crate::error::{ApiError, ErrorResponse};
use crate::models::{WebhookRequest, WebhookResponse};
use crate::mutation::{self, Action};
use crate::routes;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;

/// POST /api/webhook handler - Authenticated add/update/delete/replace
///
/// The bearer token is checked before the body is looked at. The stored
/// document is only written after the action applied cleanly.
#[utoipa::path(
    post,
    path = routes::WEBHOOK,
    request_body = WebhookRequest,
    responses(
        (status = 200, description = "Action applied", body = WebhookResponse),
        (status = 400, description = "Invalid JSON or rejected action", body = ErrorResponse),
        (status = 401, description = "Missing or wrong bearer token", body = ErrorResponse),
        (status = 500, description = "Secret not configured or storage error", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "links"
)]
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    authorize(&headers, state.config.webhook_secret.as_deref())?;

    let request: WebhookRequest = serde_json::from_slice(&body)?;
    let action = Action::from_request(request)?;
    let action_name = action.name();

    let document = state.repository.fetch().await?;
    let applied = mutation::apply(document, action, Utc::now())?;
    state.repository.save(&applied.document).await?;

    tracing::info!(
        "Applied {} action ({} links, lastUpdated: {})",
        action_name,
        applied.document.links.len(),
        applied.document.last_updated
    );

    Ok((
        StatusCode::OK,
        Json(WebhookResponse {
            success: true,
            message: format!("Links {} succeeded", action_name),
            count: applied.document.links.len(),
            last_updated: applied.document.last_updated,
            link: applied.link,
        }),
    ))
}

/// Require `Authorization: Bearer <secret>` to match exactly
fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ApiError> {
    let secret = secret.ok_or(ApiError::ServerMisconfigured)?;

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == secret => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{app_with, json_body, setup_test_app, FailingStore, SECRET};
    use crate::models::Document;
    use crate::repository::LINKS_KEY;
    use crate::store::{InMemoryStore, KvStore};
    use axum::{body::Body, http::header, http::Request, Router};
    use serde_json::{json, Value as JsonValue};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn webhook(auth: Option<&str>, body: impl Into<Body>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(routes::WEBHOOK)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(body.into()).unwrap()
    }

    fn authed(payload: &JsonValue) -> Request<Body> {
        webhook(Some(&format!("Bearer {}", SECRET)), payload.to_string())
    }

    async fn send(app: &Router, request: Request<Body>) -> axum::response::Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn stored(store: &InMemoryStore) -> Option<Document> {
        store
            .get(LINKS_KEY)
            .await
            .unwrap()
            .map(|value| serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn test_add_link() {
        let (app, store) = setup_test_app();

        let response = send(
            &app,
            authed(&json!({"action": "add", "link": {"title": "Bing", "url": "https://bing.com"}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: WebhookResponse = json_body(response).await;
        assert!(body.success);
        // sample data seeds the first write
        assert_eq!(body.count, 4);
        let link = body.link.unwrap();
        assert!(!link.id.is_empty());
        assert_eq!(link.title, "Bing");

        let document = stored(&store).await.unwrap();
        assert_eq!(document.links.len(), 4);
        assert_eq!(document.links[3], link);
        assert_eq!(document.last_updated, body.last_updated);
    }

    #[tokio::test]
    async fn test_add_increments_count() {
        let (app, _store) = setup_test_app();
        let add = |title: &str| {
            json!({"action": "add", "link": {"title": title, "url": format!("https://{}.com", title)}})
        };

        let first: WebhookResponse = json_body(send(&app, authed(&add("one"))).await).await;
        let second: WebhookResponse = json_body(send(&app, authed(&add("two"))).await).await;

        assert_eq!(second.count, first.count + 1);
        assert_ne!(first.link.unwrap().id, second.link.unwrap().id);
    }

    #[tokio::test]
    async fn test_update_link() {
        let (app, store) = setup_test_app();

        let response = send(
            &app,
            authed(&json!({"action": "update", "link": {"id": "1", "url": "https://www.google.com"}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: WebhookResponse = json_body(response).await;
        assert_eq!(body.count, 3);

        let document = stored(&store).await.unwrap();
        assert_eq!(document.links[0].url, "https://www.google.com");
        assert_eq!(document.links[0].title, "Google");
    }

    #[tokio::test]
    async fn test_update_blank_title_leaves_storage_unchanged() {
        let (app, store) = setup_test_app();
        let add = json!({"action": "add", "link": {"id": "rs", "title": "Rust", "url": "https://rust-lang.org"}});
        assert_eq!(send(&app, authed(&add)).await.status(), StatusCode::OK);
        let before = stored(&store).await.unwrap();

        let response = send(
            &app,
            authed(&json!({"action": "update", "link": {"id": "rs", "title": "", "url": ""}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.error, "Invalid link: title and url must not be empty");
        assert_eq!(stored(&store).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_null_icon_clears_it() {
        let (app, store) = setup_test_app();

        let response = send(
            &app,
            authed(&json!({"action": "update", "link": {"id": "2", "icon": null}})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = stored(&store).await.unwrap();
        assert_eq!(document.links[1].icon, None);
        assert_eq!(document.links[1].category.as_deref(), Some("Development"));
    }

    #[tokio::test]
    async fn test_get_on_webhook_is_json_405() {
        let (app, _store) = setup_test_app();

        let response = send(
            &app,
            Request::builder()
                .method("GET")
                .uri(routes::WEBHOOK)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.error, "Method not allowed: GET");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (app, store) = setup_test_app();
        let payload = json!({"action": "delete", "link": {"id": "2"}});

        let first = send(&app, authed(&payload)).await;
        assert_eq!(first.status(), StatusCode::OK);
        let body: WebhookResponse = json_body(first).await;
        assert_eq!(body.count, 2);
        assert!(body.link.is_none());
        let after_first = stored(&store).await.unwrap();

        let second = send(&app, authed(&payload)).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json_body(second).await;
        assert_eq!(error.error, "Link not found: 2");

        // failed mutation leaves storage untouched
        assert_eq!(stored(&store).await.unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_replace_with_empty_list() {
        let (app, store) = setup_test_app();

        let response = send(&app, authed(&json!({"action": "replace", "links": []}))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: WebhookResponse = json_body(response).await;
        assert_eq!(body.count, 0);

        let document = stored(&store).await.unwrap();
        assert!(document.links.is_empty());

        // an explicitly empty list is served as-is, not replaced by samples
        let response = send(
            &app,
            Request::builder()
                .method("GET")
                .uri(routes::LINKS)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let served: Document = json_body(response).await;
        assert!(served.links.is_empty());
        assert_eq!(served.last_updated, body.last_updated);
    }

    #[tokio::test]
    async fn test_validation_errors_are_400() {
        let (app, store) = setup_test_app();

        let cases = vec![
            (json!({}), "Missing action parameter"),
            (json!({"action": "upsert"}), "Unsupported action: upsert"),
            (json!({"action": "add", "link": {"title": "x"}}), "Missing required link fields (title, url)"),
            (json!({"action": "update", "link": {"title": "x"}}), "Missing link id"),
            (json!({"action": "update", "link": {"id": "404"}}), "Link not found: 404"),
            (json!({"action": "replace", "links": "nope"}), "Invalid links array"),
        ];

        for (payload, expected) in cases {
            let response = send(&app, authed(&payload)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {}", payload);
            let error: ErrorResponse = json_body(response).await;
            assert_eq!(error.error, expected);
        }

        assert!(stored(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let (app, _store) = setup_test_app();

        let response = send(
            &app,
            webhook(Some(&format!("Bearer {}", SECRET)), "{invalid json}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json_body(response).await;
        assert!(error.error.contains("JSON parse error"));
    }

    #[tokio::test]
    async fn test_unauthorized_regardless_of_payload() {
        let (app, store) = setup_test_app();
        let valid = json!({"action": "replace", "links": []}).to_string();

        let requests = vec![
            webhook(None, valid.clone()),
            webhook(Some("Bearer wrong"), valid.clone()),
            webhook(Some(SECRET), valid.clone()),
            webhook(Some(&format!("bearer {}", SECRET)), valid.clone()),
            webhook(Some(&format!("Bearer {} ", SECRET)), valid),
            webhook(Some("Bearer wrong"), "{invalid json}"),
        ];

        for request in requests {
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let error: ErrorResponse = json_body(response).await;
            assert_eq!(error.error, "Unauthorized");
        }

        assert!(stored(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_secret_is_500() {
        let app = app_with(Arc::new(InMemoryStore::new()), None);

        let response = send(
            &app,
            webhook(Some("Bearer anything"), json!({"action": "replace", "links": []}).to_string()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = json_body(response).await;
        assert!(error.error.contains("WEBHOOK_SECRET"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let app = app_with(Arc::new(FailingStore), Some(SECRET));

        let response = send(&app, authed(&json!({"action": "replace", "links": []}))).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.error, "Storage unavailable");
        assert!(error.message.is_some());
    }

    #[tokio::test]
    async fn test_webhook_preflight() {
        let (app, _store) = setup_test_app();

        let response = send(
            &app,
            Request::builder()
                .method("OPTIONS")
                .uri(routes::WEBHOOK)
                .header(header::ORIGIN, "https://admin.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("POST"));
        let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed.contains("authorization"));
        assert!(allowed.contains("content-type"));
    }

    #[test]
    fn test_authorize() {
        let mut headers = HeaderMap::new();
        assert!(matches!(authorize(&headers, None), Err(ApiError::ServerMisconfigured)));
        assert!(matches!(authorize(&headers, Some("s")), Err(ApiError::Unauthorized)));

        headers.insert(AUTHORIZATION, "Bearer s".parse().unwrap());
        assert!(authorize(&headers, Some("s")).is_ok());
        assert!(matches!(authorize(&headers, Some("t")), Err(ApiError::Unauthorized)));
    }
}
