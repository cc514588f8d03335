use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::{Category, CreateCategoryRequest};
use crate::models::recipe::Recipe;
use crate::repositories::category_repository::{CategoryDeleteOutcome, CategoryRepository};
use crate::repositories::recipe_repository::RecipeRepository;
use crate::repositories::RepositoryError;

/// Category service errors
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Cannot delete category that is used by recipes")]
    CategoryInUse { recipe_count: i64 },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<RepositoryError> for CategoryError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => CategoryError::CategoryNotFound,
            RepositoryError::DatabaseError(msg) => CategoryError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => CategoryError::DatabaseError(msg),
        }
    }
}

/// Trait defining category service operations
#[async_trait]
pub trait CategoryService: Send + Sync {
    /// All categories, sorted by name
    async fn list(&self) -> Result<Vec<Category>, CategoryError>;

    /// Fetch a single category
    async fn get(&self, id: Uuid) -> Result<Category, CategoryError>;

    /// Create a new category with a fresh id
    async fn create(&self, request: CreateCategoryRequest) -> Result<Category, CategoryError>;

    /// Guarded delete: fails with `CategoryInUse` carrying the exact count
    /// of referencing recipes, leaving the category in place.
    async fn delete(&self, id: Uuid) -> Result<(), CategoryError>;

    /// All recipes referencing a category; the category must exist
    async fn recipes_in_category(&self, id: Uuid) -> Result<Vec<Recipe>, CategoryError>;
}

/// Implementation of CategoryService
pub struct CategoryServiceImpl {
    category_repository: Arc<dyn CategoryRepository>,
    recipe_repository: Arc<dyn RecipeRepository>,
}

impl CategoryServiceImpl {
    pub fn new(
        category_repository: Arc<dyn CategoryRepository>,
        recipe_repository: Arc<dyn RecipeRepository>,
    ) -> Self {
        Self {
            category_repository,
            recipe_repository,
        }
    }
}

#[async_trait]
impl CategoryService for CategoryServiceImpl {
    async fn list(&self) -> Result<Vec<Category>, CategoryError> {
        Ok(self.category_repository.find_all().await?)
    }

    async fn get(&self, id: Uuid) -> Result<Category, CategoryError> {
        match self.category_repository.find_by_id(id).await? {
            Some(category) => Ok(category),
            None => Err(CategoryError::CategoryNotFound),
        }
    }

    async fn create(&self, request: CreateCategoryRequest) -> Result<Category, CategoryError> {
        let category = Category {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description,
        };

        Ok(self.category_repository.create(category).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), CategoryError> {
        match self.category_repository.delete_guarded(id).await {
            Ok(CategoryDeleteOutcome::Deleted) => Ok(()),
            Ok(CategoryDeleteOutcome::InUse { recipe_count }) => {
                Err(CategoryError::CategoryInUse { recipe_count })
            }
            Err(RepositoryError::NotFound) => Err(CategoryError::CategoryNotFound),
            Err(e) => Err(CategoryError::DatabaseError(e.to_string())),
        }
    }

    async fn recipes_in_category(&self, id: Uuid) -> Result<Vec<Recipe>, CategoryError> {
        if self.category_repository.find_by_id(id).await?.is_none() {
            return Err(CategoryError::CategoryNotFound);
        }

        self.recipe_repository
            .find_by_category(id)
            .await
            .map_err(|e| CategoryError::DatabaseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::RecipeQuery;
    use crate::models::recipe::{RatedRecipe, RecipePatch};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mock CategoryRepository with a recipe-count lookup for the guard
    struct MockCategoryRepository {
        categories: Mutex<HashMap<Uuid, Category>>,
        recipe_counts: Mutex<HashMap<Uuid, i64>>,
        should_fail: bool,
    }

    impl MockCategoryRepository {
        fn new() -> Self {
            Self {
                categories: Mutex::new(HashMap::new()),
                recipe_counts: Mutex::new(HashMap::new()),
                should_fail: false,
            }
        }

        fn with_failure() -> Self {
            Self {
                categories: Mutex::new(HashMap::new()),
                recipe_counts: Mutex::new(HashMap::new()),
                should_fail: true,
            }
        }

        fn set_recipe_count(&self, id: Uuid, count: i64) {
            self.recipe_counts.lock().unwrap().insert(id, count);
        }
    }

    #[async_trait]
    impl CategoryRepository for MockCategoryRepository {
        async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
            if self.should_fail {
                return Err(RepositoryError::DatabaseError("Database error".to_string()));
            }
            let mut categories = self.categories.lock().unwrap();
            categories.insert(category.id, category.clone());
            Ok(category)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
            let categories = self.categories.lock().unwrap();
            Ok(categories.get(&id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
            if self.should_fail {
                return Err(RepositoryError::DatabaseError("Database error".to_string()));
            }
            let categories = self.categories.lock().unwrap();
            let mut result: Vec<Category> = categories.values().cloned().collect();
            result.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(result)
        }

        async fn delete_guarded(
            &self,
            id: Uuid,
        ) -> Result<CategoryDeleteOutcome, RepositoryError> {
            let mut categories = self.categories.lock().unwrap();
            if !categories.contains_key(&id) {
                return Err(RepositoryError::NotFound);
            }
            let recipe_count = *self.recipe_counts.lock().unwrap().get(&id).unwrap_or(&0);
            if recipe_count > 0 {
                return Ok(CategoryDeleteOutcome::InUse { recipe_count });
            }
            categories.remove(&id);
            Ok(CategoryDeleteOutcome::Deleted)
        }
    }

    // Minimal recipe repository; only find_by_category matters here
    struct MockRecipeRepository {
        recipes: Mutex<HashMap<Uuid, Recipe>>,
    }

    impl MockRecipeRepository {
        fn new() -> Self {
            Self {
                recipes: Mutex::new(HashMap::new()),
            }
        }

        fn add(&self, category_id: Option<Uuid>) -> Recipe {
            let now = Utc::now();
            let recipe = Recipe {
                id: Uuid::new_v4(),
                name: "Spaghetti Carbonara".to_string(),
                description: None,
                ingredients: vec!["200g spaghetti".to_string()],
                instructions: vec!["Cook pasta".to_string()],
                prep_time: 10,
                cook_time: 15,
                servings: 2,
                category_id,
                created_at: now,
                updated_at: now,
            };
            self.recipes.lock().unwrap().insert(recipe.id, recipe.clone());
            recipe
        }
    }

    #[async_trait]
    impl RecipeRepository for MockRecipeRepository {
        async fn create(&self, recipe: Recipe) -> Result<Recipe, RepositoryError> {
            self.recipes.lock().unwrap().insert(recipe.id, recipe.clone());
            Ok(recipe)
        }

        async fn replace(&self, recipe: Recipe) -> Result<Recipe, RepositoryError> {
            Ok(recipe)
        }

        async fn patch(&self, _id: Uuid, _patch: RecipePatch) -> Result<Recipe, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RepositoryError> {
            Ok(self.recipes.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_category(
            &self,
            category_id: Uuid,
        ) -> Result<Vec<Recipe>, RepositoryError> {
            let recipes = self.recipes.lock().unwrap();
            Ok(recipes
                .values()
                .filter(|r| r.category_id == Some(category_id))
                .cloned()
                .collect())
        }

        async fn search(&self, _query: RecipeQuery) -> Result<Vec<RatedRecipe>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn count_all(&self) -> Result<i64, RepositoryError> {
            Ok(self.recipes.lock().unwrap().len() as i64)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.recipes
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        }
    }

    fn italian_request() -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: "Italian".to_string(),
            description: Some("Italian cuisine".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id() {
        let service = CategoryServiceImpl::new(
            Arc::new(MockCategoryRepository::new()),
            Arc::new(MockRecipeRepository::new()),
        );

        let first = service.create(italian_request()).await.unwrap();
        let second = service.create(italian_request()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.name, "Italian");
    }

    #[tokio::test]
    async fn test_delete_unused_category_succeeds() {
        let category_repo = Arc::new(MockCategoryRepository::new());
        let service = CategoryServiceImpl::new(
            category_repo.clone(),
            Arc::new(MockRecipeRepository::new()),
        );

        let category = service.create(italian_request()).await.unwrap();
        assert!(service.delete(category.id).await.is_ok());
        assert!(category_repo
            .find_by_id(category.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_referenced_category_is_blocked_with_count() {
        let category_repo = Arc::new(MockCategoryRepository::new());
        let service = CategoryServiceImpl::new(
            category_repo.clone(),
            Arc::new(MockRecipeRepository::new()),
        );

        let category = service.create(italian_request()).await.unwrap();
        category_repo.set_recipe_count(category.id, 2);

        let result = service.delete(category.id).await;
        match result {
            Err(CategoryError::CategoryInUse { recipe_count }) => assert_eq!(recipe_count, 2),
            other => panic!("expected CategoryInUse, got {:?}", other),
        }

        // The category must remain retrievable after the blocked delete
        assert!(category_repo
            .find_by_id(category.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let service = CategoryServiceImpl::new(
            Arc::new(MockCategoryRepository::new()),
            Arc::new(MockRecipeRepository::new()),
        );

        let result = service.delete(Uuid::new_v4()).await;
        assert!(matches!(result, Err(CategoryError::CategoryNotFound)));
    }

    #[tokio::test]
    async fn test_recipes_in_category_requires_existing_category() {
        let service = CategoryServiceImpl::new(
            Arc::new(MockCategoryRepository::new()),
            Arc::new(MockRecipeRepository::new()),
        );

        let result = service.recipes_in_category(Uuid::new_v4()).await;
        assert!(matches!(result, Err(CategoryError::CategoryNotFound)));
    }

    #[tokio::test]
    async fn test_recipes_in_category_returns_only_matching_recipes() {
        let category_repo = Arc::new(MockCategoryRepository::new());
        let recipe_repo = Arc::new(MockRecipeRepository::new());
        let service = CategoryServiceImpl::new(category_repo, recipe_repo.clone());

        let category = service.create(italian_request()).await.unwrap();
        let inside = recipe_repo.add(Some(category.id));
        recipe_repo.add(None);
        recipe_repo.add(Some(Uuid::new_v4()));

        let recipes = service.recipes_in_category(category.id).await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, inside.id);
    }

    #[tokio::test]
    async fn test_list_database_error() {
        let service = CategoryServiceImpl::new(
            Arc::new(MockCategoryRepository::with_failure()),
            Arc::new(MockRecipeRepository::new()),
        );

        let result = service.list().await;
        assert!(matches!(result, Err(CategoryError::DatabaseError(_))));
    }
}
