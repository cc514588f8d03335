use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{bad_request, ErrorResponse};
use crate::models::category::{Category, CreateCategoryRequest};
use crate::models::recipe::Recipe;
use crate::routes::AppState;
use crate::services::category_service::CategoryError;
use crate::validation::format_validation_errors;

/// Convert CategoryError to HTTP response
impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        match self {
            CategoryError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Category not found")),
            )
                .into_response(),
            CategoryError::CategoryInUse { recipe_count } => (
                StatusCode::CONFLICT,
                Json(ErrorResponse::with_recipe_count(
                    "Cannot delete category that is used by recipes",
                    recipe_count,
                )),
            )
                .into_response(),
            CategoryError::DatabaseError(detail) => {
                tracing::error!("category store failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// Handler for listing all categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, Response> {
    match state.category_service.list().await {
        Ok(categories) => Ok(Json(categories)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching a single category
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn get_category_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, Response> {
    match state.category_service.get(id).await {
        Ok(category) => Ok(Json(category)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a category
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category successfully created", body = Category),
        (status = 400, description = "Missing name or malformed body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), Response> {
    let Json(request) = body.map_err(|_| bad_request("Invalid request body"))?;

    if let Err(validation_errors) = request.validate() {
        return Err(bad_request(&format_validation_errors(&validation_errors)));
    }

    match state.category_service.create(request).await {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for the guarded category delete
///
/// Fails with 409 and the referencing recipe count while recipes still
/// point at the category; nothing is deleted in that case.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 204, description = "Category successfully deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category is referenced by recipes", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match state.category_service.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for listing the recipes referencing a category
#[utoipa::path(
    get,
    path = "/categories/{id}/recipes",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Recipes in the category", body = Vec<Recipe>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "categories"
)]
pub async fn list_category_recipes_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Recipe>>, Response> {
    match state.category_service.recipes_in_category(id).await {
        Ok(recipes) => Ok(Json(recipes)),
        Err(e) => Err(e.into_response()),
    }
}
