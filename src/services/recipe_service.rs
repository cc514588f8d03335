use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::query::{
    ListRecipesQuery, Page, RecipeFilter, RecipeQuery, SearchRecipesQuery, SortBy, SortOrder,
};
use crate::models::recipe::{
    CreateRecipeRequest, RatedRecipe, Recipe, RecipeDetail, RecipeListing, UpdateRecipeRequest,
};
use crate::repositories::category_repository::CategoryRepository;
use crate::repositories::rating_repository::RatingRepository;
use crate::repositories::recipe_repository::RecipeRepository;
use crate::repositories::RepositoryError;

/// Recipe service errors
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("At least one search filter is required")]
    MissingSearchFilter,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for RecipeError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => RecipeError::RecipeNotFound,
            RepositoryError::DatabaseError(msg) => RecipeError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => RecipeError::DatabaseError(msg),
        }
    }
}

/// Trait defining recipe service operations
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Paginated listing with multi-column sorting. `total` reports the
    /// unfiltered table cardinality regardless of the page requested.
    async fn list(&self, query: ListRecipesQuery) -> Result<RecipeListing, RecipeError>;

    /// Filtered search. Fails with `MissingSearchFilter` unless at least
    /// one of the text, category, or minimum-rating filters is active.
    async fn search(&self, query: SearchRecipesQuery) -> Result<Vec<RatedRecipe>, RecipeError>;

    /// Fetch a recipe with its owning category and rating aggregate inline
    async fn get(&self, id: Uuid) -> Result<RecipeDetail, RecipeError>;

    /// Create a new recipe with a fresh id and matching timestamps
    async fn create(&self, request: CreateRecipeRequest) -> Result<Recipe, RecipeError>;

    /// Full replace, preserving id and creation timestamp
    async fn replace(&self, id: Uuid, request: CreateRecipeRequest)
        -> Result<Recipe, RecipeError>;

    /// Partial update merging only the provided fields
    async fn update(&self, id: Uuid, request: UpdateRecipeRequest) -> Result<Recipe, RecipeError>;

    /// Delete a recipe unconditionally
    async fn delete(&self, id: Uuid) -> Result<(), RecipeError>;
}

/// Implementation of RecipeService
pub struct RecipeServiceImpl {
    recipe_repository: Arc<dyn RecipeRepository>,
    category_repository: Arc<dyn CategoryRepository>,
    rating_repository: Arc<dyn RatingRepository>,
}

impl RecipeServiceImpl {
    pub fn new(
        recipe_repository: Arc<dyn RecipeRepository>,
        category_repository: Arc<dyn CategoryRepository>,
        rating_repository: Arc<dyn RatingRepository>,
    ) -> Self {
        Self {
            recipe_repository,
            category_repository,
            rating_repository,
        }
    }
}

#[async_trait]
impl RecipeService for RecipeServiceImpl {
    async fn list(&self, query: ListRecipesQuery) -> Result<RecipeListing, RecipeError> {
        let limit = query.limit.unwrap_or(10).max(0);
        let offset = query.offset.unwrap_or(0).max(0);
        let sort_by = query.sort_by.unwrap_or(SortBy::CreatedAt);
        let order = query.order.unwrap_or(SortOrder::Desc);

        let recipes = self
            .recipe_repository
            .search(RecipeQuery {
                filters: Vec::new(),
                sort_by,
                order,
                page: Some(Page { limit, offset }),
            })
            .await?;

        let total = self.recipe_repository.count_all().await?;

        Ok(RecipeListing {
            recipes,
            total,
            limit,
            offset,
            sort_by,
            order,
        })
    }

    async fn search(&self, query: SearchRecipesQuery) -> Result<Vec<RatedRecipe>, RecipeError> {
        let mut filters = Vec::new();

        // A blank query string counts as no filter at all
        if let Some(q) = &query.q {
            let needle = q.trim();
            if !needle.is_empty() {
                filters.push(RecipeFilter::NameContains(needle.to_string()));
            }
        }

        if let Some(category_id) = query.category {
            filters.push(RecipeFilter::CategoryIs(category_id));
        }

        if query.wants_rating_filter() {
            filters.push(RecipeFilter::MinAverageRating(query.min_rating.unwrap_or(0)));
        }

        if filters.is_empty() {
            return Err(RecipeError::MissingSearchFilter);
        }

        let recipes = self
            .recipe_repository
            .search(RecipeQuery {
                filters,
                sort_by: SortBy::CreatedAt,
                order: SortOrder::Desc,
                page: None,
            })
            .await?;

        Ok(recipes)
    }

    async fn get(&self, id: Uuid) -> Result<RecipeDetail, RecipeError> {
        let recipe = match self.recipe_repository.find_by_id(id).await? {
            Some(recipe) => recipe,
            None => return Err(RecipeError::RecipeNotFound),
        };

        let category = match recipe.category_id {
            Some(category_id) => self
                .category_repository
                .find_by_id(category_id)
                .await
                .map_err(|e| RecipeError::DatabaseError(e.to_string()))?,
            None => None,
        };

        let aggregate = self
            .rating_repository
            .aggregate_for_recipe(id)
            .await
            .map_err(|e| RecipeError::DatabaseError(e.to_string()))?;

        Ok(RecipeDetail {
            recipe,
            category,
            aggregate,
        })
    }

    async fn create(&self, request: CreateRecipeRequest) -> Result<Recipe, RecipeError> {
        let now = Utc::now();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
            ingredients: request.ingredients,
            instructions: request.instructions,
            prep_time: request.prep_time,
            cook_time: request.cook_time,
            servings: request.servings,
            category_id: request.category_id,
            created_at: now,
            updated_at: now,
        };

        Ok(self.recipe_repository.create(recipe).await?)
    }

    async fn replace(
        &self,
        id: Uuid,
        request: CreateRecipeRequest,
    ) -> Result<Recipe, RecipeError> {
        // The repository keeps the stored created_at and stamps updated_at;
        // the timestamps here are placeholders for the entity shape.
        let now = Utc::now();
        let recipe = Recipe {
            id,
            name: request.name,
            description: request.description,
            ingredients: request.ingredients,
            instructions: request.instructions,
            prep_time: request.prep_time,
            cook_time: request.cook_time,
            servings: request.servings,
            category_id: request.category_id,
            created_at: now,
            updated_at: now,
        };

        Ok(self.recipe_repository.replace(recipe).await?)
    }

    async fn update(&self, id: Uuid, request: UpdateRecipeRequest) -> Result<Recipe, RecipeError> {
        Ok(self.recipe_repository.patch(id, request.into()).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RecipeError> {
        Ok(self.recipe_repository.delete(id).await?)
    }
}
