use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::Category;
use crate::repositories::RepositoryError;

/// Outcome of a guarded category delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryDeleteOutcome {
    Deleted,
    /// The delete was aborted because recipes still reference the category
    InUse { recipe_count: i64 },
}

/// Trait defining category repository operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Find a category by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;

    /// Find all categories, sorted by name
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Delete a category unless recipes still reference it. The reference
    /// count and the delete run in one transaction so the guard cannot go
    /// stale between the count and the delete.
    async fn delete_guarded(&self, id: Uuid) -> Result<CategoryDeleteOutcome, RepositoryError>;
}

/// PostgreSQL implementation of CategoryRepository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        let result = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(category) => Ok(category),
            Err(sqlx::Error::Database(db_err)) => {
                Err(RepositoryError::DatabaseError(db_err.to_string()))
            }
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let result =
            sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;

        match result {
            Ok(category) => Ok(category),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let result = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(categories) => Ok(categories),
            Err(e) => Err(RepositoryError::DatabaseError(e.to_string())),
        }
    }

    async fn delete_guarded(&self, id: Uuid) -> Result<CategoryDeleteOutcome, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM categories WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if existing.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let recipe_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE category_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        if recipe_count > 0 {
            // Dropping the transaction rolls it back; nothing was written
            return Ok(CategoryDeleteOutcome::InUse { recipe_count });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(CategoryDeleteOutcome::Deleted)
    }
}
