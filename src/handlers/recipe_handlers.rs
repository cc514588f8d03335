use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::{bad_request, ErrorResponse};
use crate::models::query::{ListRecipesQuery, SearchRecipesQuery, SortBy};
use crate::models::recipe::{
    CreateRecipeRequest, RatedRecipeListResponse, Recipe, RecipeDetail, RecipeListResponse,
    UpdateRecipeRequest,
};
use crate::routes::AppState;
use crate::services::recipe_service::RecipeError;
use crate::validation::format_validation_errors;

/// Convert RecipeError to HTTP response
impl IntoResponse for RecipeError {
    fn into_response(self) -> Response {
        match self {
            RecipeError::RecipeNotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("Recipe not found")),
            )
                .into_response(),
            RecipeError::MissingSearchFilter => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "Search query, category, or minimum rating filter is required",
                )),
            )
                .into_response(),
            RecipeError::DatabaseError(detail) => {
                tracing::error!("recipe store failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// Handler for the paginated recipe listing
///
/// Sorting by rating joins the per-recipe aggregate; those rows carry an
/// `averageRating` annotation that is null for unrated recipes.
#[utoipa::path(
    get,
    path = "/recipes",
    params(ListRecipesQuery),
    responses(
        (status = 200, description = "Paginated recipe listing", body = RecipeListResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn list_recipes_handler(
    State(state): State<AppState>,
    query: Result<Query<ListRecipesQuery>, QueryRejection>,
) -> Result<Response, Response> {
    let Query(query) = query.map_err(|_| bad_request("Invalid query parameters"))?;

    match state.recipe_service.list(query).await {
        Ok(listing) => {
            if listing.sort_by == SortBy::Rating {
                Ok(Json(RatedRecipeListResponse::from(listing)).into_response())
            } else {
                Ok(Json(RecipeListResponse::from(listing)).into_response())
            }
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for filtered recipe search
///
/// Requires at least one active filter; all given filters are ANDed. With
/// `minRating` active the results carry the `averageRating` annotation.
#[utoipa::path(
    get,
    path = "/recipes/search",
    params(SearchRecipesQuery),
    responses(
        (status = 200, description = "Matching recipes", body = Vec<Recipe>),
        (status = 400, description = "No search filter given", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn search_recipes_handler(
    State(state): State<AppState>,
    query: Result<Query<SearchRecipesQuery>, QueryRejection>,
) -> Result<Response, Response> {
    let Query(query) = query.map_err(|_| bad_request("Invalid query parameters"))?;
    let annotated = query.wants_rating_filter();

    match state.recipe_service.search(query).await {
        Ok(recipes) => {
            if annotated {
                Ok(Json(recipes).into_response())
            } else {
                let plain: Vec<Recipe> = recipes.into_iter().map(|row| row.recipe).collect();
                Ok(Json(plain).into_response())
            }
        }
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fetching a single recipe with category and rating aggregate
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetail),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetail>, Response> {
    match state.recipe_service.get(id).await {
        Ok(detail) => Ok(Json(detail)),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for creating a recipe
#[utoipa::path(
    post,
    path = "/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe successfully created", body = Recipe),
        (status = 400, description = "Missing required field or malformed body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    body: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), Response> {
    let Json(request) = body.map_err(|_| bad_request("Invalid request body"))?;

    if let Err(validation_errors) = request.validate() {
        return Err(bad_request(&format_validation_errors(&validation_errors)));
    }

    match state.recipe_service.create(request).await {
        Ok(recipe) => Ok((StatusCode::CREATED, Json(recipe))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for fully replacing a recipe
///
/// Every required field must be present again; id and createdAt are kept.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = CreateRecipeRequest,
    responses(
        (status = 200, description = "Recipe successfully replaced", body = Recipe),
        (status = 400, description = "Missing required field or malformed body", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn replace_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), Response> {
    let Json(request) = body.map_err(|_| bad_request("Invalid request body"))?;

    if let Err(validation_errors) = request.validate() {
        return Err(bad_request(&format_validation_errors(&validation_errors)));
    }

    match state.recipe_service.replace(id, request).await {
        Ok(recipe) => Ok((StatusCode::OK, Json(recipe))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for partially updating a recipe
///
/// Only the provided fields change; everything else is left untouched.
#[utoipa::path(
    patch,
    path = "/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe successfully updated", body = Recipe),
        (status = 400, description = "Malformed body or invalid field value", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn patch_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Recipe>), Response> {
    let Json(request) = body.map_err(|_| bad_request("Invalid request body"))?;

    if let Err(validation_errors) = request.validate() {
        return Err(bad_request(&format_validation_errors(&validation_errors)));
    }

    match state.recipe_service.update(id, request).await {
        Ok(recipe) => Ok((StatusCode::OK, Json(recipe))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for deleting a recipe
///
/// Unconditional; ratings attached to the recipe are left in place.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe successfully deleted"),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "recipes"
)]
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Response> {
    match state.recipe_service.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e.into_response()),
    }
}
