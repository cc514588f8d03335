use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::rating::{CreateRatingRequest, Rating, RatingAggregate};
use crate::repositories::rating_repository::RatingRepository;
use crate::repositories::recipe_repository::RecipeRepository;
use crate::repositories::RepositoryError;

/// Rating service errors
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("Rating not found")]
    RatingNotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Trait defining rating service operations
#[async_trait]
pub trait RatingService: Send + Sync {
    /// Attach a rating to an existing recipe
    async fn create(
        &self,
        recipe_id: Uuid,
        request: CreateRatingRequest,
    ) -> Result<Rating, RatingError>;

    /// All ratings for an existing recipe, newest first
    async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>, RatingError>;

    /// Derived average/count pair for an existing recipe
    async fn average_for_recipe(&self, recipe_id: Uuid) -> Result<RatingAggregate, RatingError>;

    /// Delete a rating unconditionally
    async fn delete(&self, id: Uuid) -> Result<(), RatingError>;
}

/// Implementation of RatingService
pub struct RatingServiceImpl {
    rating_repository: Arc<dyn RatingRepository>,
    recipe_repository: Arc<dyn RecipeRepository>,
}

impl RatingServiceImpl {
    pub fn new(
        rating_repository: Arc<dyn RatingRepository>,
        recipe_repository: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            rating_repository,
            recipe_repository,
        }
    }

    async fn ensure_recipe_exists(&self, recipe_id: Uuid) -> Result<(), RatingError> {
        let found = self
            .recipe_repository
            .find_by_id(recipe_id)
            .await
            .map_err(|e| RatingError::DatabaseError(e.to_string()))?;

        if found.is_none() {
            return Err(RatingError::RecipeNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl RatingService for RatingServiceImpl {
    async fn create(
        &self,
        recipe_id: Uuid,
        request: CreateRatingRequest,
    ) -> Result<Rating, RatingError> {
        self.ensure_recipe_exists(recipe_id).await?;

        let rating = Rating {
            id: Uuid::new_v4(),
            recipe_id,
            rating: request.rating,
            comment: request.comment,
            created_at: Utc::now(),
        };

        self.rating_repository
            .create(rating)
            .await
            .map_err(|e| RatingError::DatabaseError(e.to_string()))
    }

    async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>, RatingError> {
        self.ensure_recipe_exists(recipe_id).await?;

        self.rating_repository
            .find_by_recipe(recipe_id)
            .await
            .map_err(|e| RatingError::DatabaseError(e.to_string()))
    }

    async fn average_for_recipe(&self, recipe_id: Uuid) -> Result<RatingAggregate, RatingError> {
        self.ensure_recipe_exists(recipe_id).await?;

        self.rating_repository
            .aggregate_for_recipe(recipe_id)
            .await
            .map_err(|e| RatingError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RatingError> {
        match self.rating_repository.delete(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(RatingError::RatingNotFound),
            Err(e) => Err(RatingError::DatabaseError(e.to_string())),
        }
    }
}
