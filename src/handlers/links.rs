use crate::error::{ApiError, ErrorResponse};
use crate::models::Document;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /api/links handler - Public read of the links document
///
/// Serves the built-in sample list until the first webhook write.
#[utoipa::path(
    get,
    path = routes::LINKS,
    responses(
        (status = 200, description = "Current links document", body = Document),
        (status = 500, description = "Storage error", body = ErrorResponse)
    ),
    tag = "links"
)]
pub async fn links_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let document = state.repository.fetch().await?;

    tracing::info!("Served {} links", document.links.len());
    Ok((StatusCode::OK, Json(document)))
}
