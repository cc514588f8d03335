use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;

use recipe_api::models::category::CreateCategoryRequest;
use recipe_api::models::recipe::CreateRecipeRequest;
use recipe_api::repositories::category_repository::PostgresCategoryRepository;
use recipe_api::repositories::rating_repository::PostgresRatingRepository;
use recipe_api::repositories::recipe_repository::PostgresRecipeRepository;
use recipe_api::services::category_service::{CategoryService, CategoryServiceImpl};
use recipe_api::services::recipe_service::{RecipeService, RecipeServiceImpl};

/// Seeds the database with a couple of categories and recipes for local
/// development.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let recipe_repository = Arc::new(PostgresRecipeRepository::new(pool.clone()));
    let category_repository = Arc::new(PostgresCategoryRepository::new(pool.clone()));
    let rating_repository = Arc::new(PostgresRatingRepository::new(pool));

    let category_service = CategoryServiceImpl::new(
        category_repository.clone(),
        recipe_repository.clone(),
    );
    let recipe_service = RecipeServiceImpl::new(
        recipe_repository,
        category_repository,
        rating_repository,
    );

    tracing::info!("seeding database");

    let italian = category_service
        .create(CreateCategoryRequest {
            name: "Italian".to_string(),
            description: Some("Italian cuisine".to_string()),
        })
        .await?;

    let dessert = category_service
        .create(CreateCategoryRequest {
            name: "Dessert".to_string(),
            description: Some("Sweet treats".to_string()),
        })
        .await?;

    recipe_service
        .create(CreateRecipeRequest {
            name: "Spaghetti Carbonara".to_string(),
            description: Some("A classic Italian pasta dish".to_string()),
            ingredients: vec![
                "200g spaghetti".to_string(),
                "100g pancetta".to_string(),
                "2 eggs".to_string(),
                "50g pecorino cheese".to_string(),
                "Black pepper".to_string(),
            ],
            instructions: vec![
                "Cook pasta".to_string(),
                "Fry pancetta".to_string(),
                "Mix eggs and cheese".to_string(),
                "Combine all ingredients".to_string(),
            ],
            prep_time: 10,
            cook_time: 15,
            servings: 2,
            category_id: Some(italian.id),
        })
        .await?;

    recipe_service
        .create(CreateRecipeRequest {
            name: "Tiramisu".to_string(),
            description: Some("Classic Italian coffee-flavored dessert".to_string()),
            ingredients: vec![
                "Ladyfingers".to_string(),
                "Coffee".to_string(),
                "Mascarpone cheese".to_string(),
                "Eggs".to_string(),
                "Sugar".to_string(),
                "Cocoa powder".to_string(),
            ],
            instructions: vec![
                "Dip ladyfingers in coffee".to_string(),
                "Mix mascarpone with eggs and sugar".to_string(),
                "Layer ingredients".to_string(),
                "Refrigerate".to_string(),
            ],
            prep_time: 30,
            cook_time: 0,
            servings: 8,
            category_id: Some(dessert.id),
        })
        .await?;

    tracing::info!("database seeded successfully");

    Ok(())
}
