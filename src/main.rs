use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;

use recipe_api::repositories::category_repository::PostgresCategoryRepository;
use recipe_api::repositories::rating_repository::PostgresRatingRepository;
use recipe_api::repositories::recipe_repository::PostgresRecipeRepository;
use recipe_api::routes::{app, AppState};
use recipe_api::services::category_service::{CategoryService, CategoryServiceImpl};
use recipe_api::services::rating_service::{RatingService, RatingServiceImpl};
use recipe_api::services::recipe_service::{RecipeService, RecipeServiceImpl};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    // Get configuration from environment
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3030".to_string());

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("migrations completed");

    // Initialize repositories
    let recipe_repository = Arc::new(PostgresRecipeRepository::new(pool.clone()));
    let category_repository = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let rating_repository = Arc::new(PostgresRatingRepository::new(pool.clone()));

    // Initialize services
    let recipe_service: Arc<dyn RecipeService> = Arc::new(RecipeServiceImpl::new(
        recipe_repository.clone(),
        category_repository.clone(),
        rating_repository.clone(),
    ));
    let category_service: Arc<dyn CategoryService> = Arc::new(CategoryServiceImpl::new(
        category_repository,
        recipe_repository.clone(),
    ));
    let rating_service: Arc<dyn RatingService> =
        Arc::new(RatingServiceImpl::new(rating_repository, recipe_repository));

    let state = AppState {
        recipe_service,
        category_service,
        rating_service,
    };

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server running on http://{}", addr);
    tracing::info!("API docs at http://{}/api/docs", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
