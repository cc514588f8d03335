use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::query::{like_pattern, RecipeFilter, RecipeQuery};
use crate::models::recipe::{RatedRecipe, Recipe, RecipePatch};
use crate::repositories::RepositoryError;

const RECIPE_COLUMNS: &str = "id, name, description, ingredients, instructions, \
                              prep_time, cook_time, servings, category_id, created_at, updated_at";

/// Trait defining recipe repository operations
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persist a new recipe
    async fn create(&self, recipe: Recipe) -> Result<Recipe, RepositoryError>;

    /// Full replace: overwrite every mutable field, refresh `updated_at`,
    /// preserve `id` and `created_at`
    async fn replace(&self, recipe: Recipe) -> Result<Recipe, RepositoryError>;

    /// Partial update: merge the provided fields into the stored row and
    /// refresh `updated_at`, all inside one transaction
    async fn patch(&self, id: Uuid, patch: RecipePatch) -> Result<Recipe, RepositoryError>;

    /// Find a recipe by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepositoryError>;

    /// Find all recipes referencing a category, newest first
    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Recipe>, RepositoryError>;

    /// Execute a composed filter/sort/paginate query
    async fn search(&self, query: RecipeQuery) -> Result<Vec<RatedRecipe>, RepositoryError>;

    /// Unfiltered table cardinality, reported as `total` by the listing
    async fn count_all(&self) -> Result<i64, RepositoryError>;

    /// Delete a recipe by ID. Ratings for the recipe are left in place.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// PostgreSQL implementation of RecipeRepository
pub struct PostgresRecipeRepository {
    pool: PgPool,
}

impl PostgresRecipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeRepository for PostgresRecipeRepository {
    async fn create(&self, recipe: Recipe) -> Result<Recipe, RepositoryError> {
        let result = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipes (id, name, description, ingredients, instructions,
                                 prep_time, cook_time, servings, category_id,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.prep_time)
        .bind(recipe.cook_time)
        .bind(recipe.servings)
        .bind(recipe.category_id)
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(recipe) => Ok(recipe),
            Err(sqlx::Error::Database(db_err)) => {
                Err(RepositoryError::DatabaseError(db_err.to_string()))
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn replace(&self, recipe: Recipe) -> Result<Recipe, RepositoryError> {
        let result = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET name = $2,
                description = $3,
                ingredients = $4,
                instructions = $5,
                prep_time = $6,
                cook_time = $7,
                servings = $8,
                category_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(recipe.id)
        .bind(&recipe.name)
        .bind(&recipe.description)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.prep_time)
        .bind(recipe.cook_time)
        .bind(recipe.servings)
        .bind(recipe.category_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(recipe)) => Ok(recipe),
            Ok(None) => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn patch(&self, id: Uuid, patch: RecipePatch) -> Result<Recipe, RepositoryError> {
        // The row is locked for the read-merge-write so a concurrent update
        // cannot interleave between the read and the write.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let existing = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {} FROM recipes WHERE id = $1 FOR UPDATE",
            RECIPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let existing = match existing {
            Some(recipe) => recipe,
            None => return Err(RepositoryError::NotFound),
        };

        let merged = patch.apply(existing);

        let updated = sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipes
            SET name = $2,
                description = $3,
                ingredients = $4,
                instructions = $5,
                prep_time = $6,
                cook_time = $7,
                servings = $8,
                category_id = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RECIPE_COLUMNS
        ))
        .bind(id)
        .bind(&merged.name)
        .bind(&merged.description)
        .bind(&merged.ingredients)
        .bind(&merged.instructions)
        .bind(merged.prep_time)
        .bind(merged.cook_time)
        .bind(merged.servings)
        .bind(merged.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(updated)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepositoryError> {
        let result = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {} FROM recipes WHERE id = $1",
            RECIPE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(recipe) => Ok(recipe),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_category(&self, category_id: Uuid) -> Result<Vec<Recipe>, RepositoryError> {
        let result = sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {} FROM recipes WHERE category_id = $1 ORDER BY created_at DESC",
            RECIPE_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(recipes) => Ok(recipes),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn search(&self, query: RecipeQuery) -> Result<Vec<RatedRecipe>, RepositoryError> {
        let sql = query.to_sql();
        let mut sqlx_query = sqlx::query_as::<_, RatedRecipe>(&sql);

        // Bind parameters in the same order the composer rendered them
        for filter in &query.filters {
            sqlx_query = match filter {
                RecipeFilter::NameContains(needle) => sqlx_query.bind(like_pattern(needle)),
                RecipeFilter::CategoryIs(category_id) => sqlx_query.bind(*category_id),
                RecipeFilter::MinAverageRating(threshold) => {
                    sqlx_query.bind(f64::from(*threshold))
                }
            };
        }

        if let Some(page) = query.page {
            sqlx_query = sqlx_query.bind(page.limit).bind(page.offset);
        }

        sqlx_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn count_all(&self) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
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
