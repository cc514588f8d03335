use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{bad_request, ErrorResponse};
use crate::models::rating::{CreateRatingRequest, Rating, RatingAggregate};
use crate::routes::AppState;
use crate::services::rating_service::RatingError;
use crate::validation::format_validation_errors;

/// Convert RatingError to HTTP response
impl IntoResponse for RatingError {
    fn into_response(self) -> Response {
        match self {
            RatingError::RecipeNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Recipe not found")),
            )
                .into_response(),
            RatingError::RatingNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Rating not found")),
            )
                .into_response(),
            RatingError::DatabaseError(detail) => {
                tracing::error!("rating store failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// Handler for rating a recipe
#[utoipa::path(
    post,
    path = "/recipes/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating successfully created", body = Rating),
        (status = 400, description = "Rating out of range or malformed body", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn create_rating_handler(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    body: Result<Json<CreateRatingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Rating>), Response> {
    let Json(request) = body.map_err(|_| bad_request("Invalid request body"))?;

    if let Err(validation_errors) = request.validate() {
        return Err(bad_request(&format_validation_errors(&validation_errors)));
    }

    match state.rating_service.create(recipe_id, request).await {
        Ok(rating) => Ok((StatusCode::CREATED, Json(rating))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing a recipe's ratings
#[utoipa::path(
    get,
    path = "/recipes/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Ratings for the recipe", body = Vec<Rating>),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn list_ratings_handler(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<Vec<Rating>>, Response> {
    match state.rating_service.list_for_recipe(recipe_id).await {
        Ok(ratings) => Ok(Json(ratings)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for a recipe's average-rating summary
///
/// A recipe with no ratings reports averageRating 0 and ratingCount 0.
#[utoipa::path(
    get,
    path = "/recipes/{id}/average-rating",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Average rating summary", body = RatingAggregate),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn average_rating_handler(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> Result<Json<RatingAggregate>, Response> {
    match state.rating_service.average_for_recipe(recipe_id).await {
        Ok(aggregate) => Ok(Json(aggregate)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a rating
#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    params(
        ("id" = Uuid, Path, description = "Rating ID")
    ),
    responses(
        (status = 204, description = "Rating successfully deleted"),
        (status = 404, description = "Rating not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "ratings"
)]
pub async fn delete_rating_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match state.rating_service.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
