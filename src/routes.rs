use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::category_handlers::{
    create_category_handler, delete_category_handler, get_category_handler,
    list_categories_handler, list_category_recipes_handler,
};
use crate::handlers::rating_handlers::{
    average_rating_handler, create_rating_handler, delete_rating_handler, list_ratings_handler,
};
use crate::handlers::recipe_handlers::{
    create_recipe_handler, delete_recipe_handler, get_recipe_handler, list_recipes_handler,
    patch_recipe_handler, replace_recipe_handler, search_recipes_handler,
};
use crate::services::category_service::CategoryService;
use crate::services::rating_service::RatingService;
use crate::services::recipe_service::RecipeService;

/// Shared handler state: one service handle per entity
#[derive(Clone)]
pub struct AppState {
    pub recipe_service: Arc<dyn RecipeService>,
    pub category_service: Arc<dyn CategoryService>,
    pub rating_service: Arc<dyn RatingService>,
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::recipe_handlers::list_recipes_handler,
        crate::handlers::recipe_handlers::search_recipes_handler,
        crate::handlers::recipe_handlers::get_recipe_handler,
        crate::handlers::recipe_handlers::create_recipe_handler,
        crate::handlers::recipe_handlers::replace_recipe_handler,
        crate::handlers::recipe_handlers::patch_recipe_handler,
        crate::handlers::recipe_handlers::delete_recipe_handler,
        crate::handlers::category_handlers::list_categories_handler,
        crate::handlers::category_handlers::get_category_handler,
        crate::handlers::category_handlers::create_category_handler,
        crate::handlers::category_handlers::delete_category_handler,
        crate::handlers::category_handlers::list_category_recipes_handler,
        crate::handlers::rating_handlers::create_rating_handler,
        crate::handlers::rating_handlers::list_ratings_handler,
        crate::handlers::rating_handlers::average_rating_handler,
        crate::handlers::rating_handlers::delete_rating_handler,
    ),
    components(
        schemas(
            crate::models::category::Category,
            crate::models::category::CreateCategoryRequest,
            crate::models::recipe::Recipe,
            crate::models::recipe::RatedRecipe,
            crate::models::recipe::RecipeDetail,
            crate::models::recipe::CreateRecipeRequest,
            crate::models::recipe::UpdateRecipeRequest,
            crate::models::recipe::RecipeListResponse,
            crate::models::recipe::RatedRecipeListResponse,
            crate::models::rating::Rating,
            crate::models::rating::CreateRatingRequest,
            crate::models::rating::RatingAggregate,
            crate::models::query::SortBy,
            crate::models::query::SortOrder,
            crate::handlers::ErrorResponse,
        )
    ),
    tags(
        (name = "recipes", description = "Recipe CRUD, listing, and search"),
        (name = "categories", description = "Category management"),
        (name = "ratings", description = "Recipe ratings")
    ),
    info(
        title = "Recipe API",
        version = "0.1.0",
        description = "REST API for managing recipes, categories, and ratings",
    )
)]
struct ApiDoc;

/// Root route
async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Recipe API is running" }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Builds the application router. Shared by the server binary and the
/// integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // The literal /recipes/search route takes precedence over the
        // parameterized /recipes/:id route
        .route(
            "/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route("/recipes/search", get(search_recipes_handler))
        .route(
            "/recipes/:id",
            get(get_recipe_handler)
                .put(replace_recipe_handler)
                .patch(patch_recipe_handler)
                .delete(delete_recipe_handler),
        )
        .route(
            "/recipes/:id/ratings",
            get(list_ratings_handler).post(create_rating_handler),
        )
        .route("/recipes/:id/average-rating", get(average_rating_handler))
        .route("/ratings/:id", delete(delete_rating_handler))
        .route(
            "/categories",
            get(list_categories_handler).post(create_category_handler),
        )
        .route(
            "/categories/:id",
            get(get_category_handler).delete(delete_category_handler),
        )
        .route("/categories/:id/recipes", get(list_category_recipes_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
