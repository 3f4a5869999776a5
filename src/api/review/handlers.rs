use crate::api::models::*;
use crate::model::{Review, ReviewId};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;

type IdPath = Result<Path<String>, PathRejection>;

fn parse_id(raw: &str) -> Result<ReviewId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|e| ApiError::Validation(format!("invalid id: {}", e)))
}

fn path_id(path: IdPath) -> Result<ReviewId, ApiError> {
    let Path(raw) = path?;
    parse_id(&raw)
}

/// POST /review
pub async fn create_review_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    info!(title = %request.title, "Creating review");

    let review = Review::new(
        request.title,
        request.director,
        &request.release_date,
        request.rating,
        request.review_notes,
    );
    let created = state.store.create(&review).await?;

    info!(id = created.review.id, "{}", created.confirmation);
    Ok(Json(created.review))
}

/// GET /review/{id}
pub async fn get_review_handler(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<Review>, ApiError> {
    let id = path_id(path)?;
    let review = state.store.get_by_id(id).await?;
    Ok(Json(review))
}

/// PUT /review/{id}
///
/// The path id wins over anything in the body. The release date is stored as
/// sent so that retrying the same request leaves the same row.
pub async fn update_review_handler(
    State(state): State<AppState>,
    path: IdPath,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let id = path_id(path)?;
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    let change = Review {
        id,
        title: request.title,
        director: request.director,
        release_date: request.release_date,
        rating: request.rating,
        review_notes: request.review_notes,
        date_created: String::new(),
    };
    let updated = state.store.update(&change).await?;

    info!(id, "Updated review");
    Ok(Json(updated))
}

/// DELETE /review/{id}
pub async fn delete_review_handler(
    State(state): State<AppState>,
    path: IdPath,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = path_id(path)?;
    state.store.delete(id).await?;
    Ok(Json(DeleteResponse::success()))
}
