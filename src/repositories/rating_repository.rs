use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::rating::{Rating, RatingAggregate};
use crate::repositories::RepositoryError;

/// Trait defining rating repository operations
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Persist a new rating
    async fn create(&self, rating: Rating) -> Result<Rating, RepositoryError>;

    /// Find all ratings for a recipe, newest first
    async fn find_by_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>, RepositoryError>;

    /// Compute the derived (average, count) pair for a recipe. A recipe
    /// with no ratings yields average 0 and count 0.
    async fn aggregate_for_recipe(
        &self,
        recipe_id: Uuid,
    ) -> Result<RatingAggregate, RepositoryError>;

    /// Delete a rating by ID
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// PostgreSQL implementation of RatingRepository
pub struct PostgresRatingRepository {
    pool: PgPool,
}

impl PostgresRatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for PostgresRatingRepository {
    async fn create(&self, rating: Rating) -> Result<Rating, RepositoryError> {
        let result = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (id, recipe_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, recipe_id, rating, comment, created_at
            "#,
        )
        .bind(rating.id)
        .bind(rating.recipe_id)
        .bind(rating.rating)
        .bind(&rating.comment)
        .bind(rating.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(rating) => Ok(rating),
            Err(sqlx::Error::Database(db_err)) => {
                Err(RepositoryError::ConstraintViolation(db_err.to_string()))
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>, RepositoryError> {
        let result = sqlx::query_as::<_, Rating>(
            r#"
            SELECT id, recipe_id, rating, comment, created_at
            FROM ratings
            WHERE recipe_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(ratings) => Ok(ratings),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn aggregate_for_recipe(
        &self,
        recipe_id: Uuid,
    ) -> Result<RatingAggregate, RepositoryError> {
        sqlx::query_as::<_, RatingAggregate>(
            r#"
            SELECT COALESCE(ROUND(AVG(rating)::numeric, 1), 0)::float8 AS average_rating,
                   COUNT(*) AS rating_count
            FROM ratings
            WHERE recipe_id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(query_result) => {
                if query_result.rows_affected() == 0 {
                    Err(RepositoryError::NotFound)
                } else {
                    Ok(())
                }
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }
}
