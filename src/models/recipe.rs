use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::category::Category;
use crate::models::query::{SortBy, SortOrder};
use crate::models::rating::RatingAggregate;
use crate::validation::validate_not_blank;

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Preparation time in minutes
    pub prep_time: i32,
    /// Cooking time in minutes
    pub cook_time: i32,
    pub servings: i32,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recipe annotated with its derived average rating. The annotation is
/// null for recipes with no ratings; the collection endpoints keep that
/// null distinct from the 0 reported by the single-recipe endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatedRecipe {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub recipe: Recipe,
    pub average_rating: Option<f64>,
}

/// Recipe detail returned by `GET /recipes/{id}`: the entity plus its
/// owning category (or null) and the rating aggregate inline.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub category: Option<Category>,
    #[serde(flatten)]
    pub aggregate: RatingAggregate,
}

/// Request payload for creating a recipe; also the full-replace payload
/// for PUT, which requires every mandatory field to be present again.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Spaghetti Carbonara",
    "description": "A classic Italian pasta dish",
    "ingredients": ["200g spaghetti", "100g pancetta", "2 eggs"],
    "instructions": ["Cook pasta", "Fry pancetta", "Combine all ingredients"],
    "prepTime": 10,
    "cookTime": 15,
    "servings": 2
}))]
pub struct CreateRecipeRequest {
    #[validate(
        length(min = 1, max = 255, message = "Recipe name is required"),
        custom(function = "validate_not_blank")
    )]
    #[schema(min_length = 1, max_length = 255)]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: Vec<String>,

    #[validate(length(min = 1, message = "At least one instruction is required"))]
    pub instructions: Vec<String>,

    #[validate(range(min = 0, message = "Prep time cannot be negative"))]
    #[schema(minimum = 0)]
    pub prep_time: i32,

    #[validate(range(min = 0, message = "Cook time cannot be negative"))]
    #[schema(minimum = 0)]
    pub cook_time: i32,

    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    #[schema(minimum = 1)]
    pub servings: i32,

    pub category_id: Option<Uuid>,
}

/// Request payload for PATCH: only the provided fields change. An omitted
/// field is left untouched, never nulled.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({ "servings": 6 }))]
pub struct UpdateRecipeRequest {
    #[validate(
        length(min = 1, max = 255, message = "Recipe name is required"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    pub ingredients: Option<Vec<String>>,

    #[validate(length(min = 1, message = "At least one instruction is required"))]
    pub instructions: Option<Vec<String>>,

    #[validate(range(min = 0, message = "Prep time cannot be negative"))]
    pub prep_time: Option<i32>,

    #[validate(range(min = 0, message = "Cook time cannot be negative"))]
    pub cook_time: Option<i32>,

    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    pub servings: Option<i32>,

    pub category_id: Option<Uuid>,
}

/// Field changes applied to an existing recipe inside the repository's
/// update transaction.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub category_id: Option<Uuid>,
}

impl RecipePatch {
    /// Merges the patch into an existing recipe. The id and creation
    /// timestamp are preserved; the caller refreshes `updated_at`.
    pub fn apply(self, existing: Recipe) -> Recipe {
        Recipe {
            id: existing.id,
            name: self.name.unwrap_or(existing.name),
            description: self.description.or(existing.description),
            ingredients: self.ingredients.unwrap_or(existing.ingredients),
            instructions: self.instructions.unwrap_or(existing.instructions),
            prep_time: self.prep_time.unwrap_or(existing.prep_time),
            cook_time: self.cook_time.unwrap_or(existing.cook_time),
            servings: self.servings.unwrap_or(existing.servings),
            category_id: self.category_id.or(existing.category_id),
            created_at: existing.created_at,
            updated_at: existing.updated_at,
        }
    }
}

impl From<UpdateRecipeRequest> for RecipePatch {
    fn from(request: UpdateRecipeRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            ingredients: request.ingredients,
            instructions: request.instructions,
            prep_time: request.prep_time,
            cook_time: request.cook_time,
            servings: request.servings,
            category_id: request.category_id,
        }
    }
}

/// Resolved listing produced by the recipe service: rows plus the echoed
/// pagination and sort parameters with defaults applied.
#[derive(Debug, Clone)]
pub struct RecipeListing {
    pub recipes: Vec<RatedRecipe>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

/// Listing envelope returned by `GET /recipes`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeListResponse {
    pub recipes: Vec<Recipe>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

impl From<RecipeListing> for RecipeListResponse {
    fn from(listing: RecipeListing) -> Self {
        Self {
            recipes: listing.recipes.into_iter().map(|row| row.recipe).collect(),
            total: listing.total,
            limit: listing.limit,
            offset: listing.offset,
            sort_by: listing.sort_by,
            order: listing.order,
        }
    }
}

/// Listing envelope returned by `GET /recipes?sortBy=rating`, where each
/// row carries its average-rating annotation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatedRecipeListResponse {
    pub recipes: Vec<RatedRecipe>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub sort_by: SortBy,
    pub order: SortOrder,
}

impl From<RecipeListing> for RatedRecipeListResponse {
    fn from(listing: RecipeListing) -> Self {
        Self {
            recipes: listing.recipes,
            total: listing.total,
            limit: listing.limit,
            offset: listing.offset,
            sort_by: listing.sort_by,
            order: listing.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: "Spaghetti Carbonara".to_string(),
            description: Some("A classic Italian pasta dish".to_string()),
            ingredients: vec!["200g spaghetti".to_string(), "2 eggs".to_string()],
            instructions: vec!["Cook pasta".to_string(), "Combine".to_string()],
            prep_time: 10,
            cook_time: 15,
            servings: 2,
            category_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_apply_merges_only_provided_fields() {
        let existing = sample_recipe();
        let original = existing.clone();

        let patch = RecipePatch {
            servings: Some(6),
            ..Default::default()
        };
        let merged = patch.apply(existing);

        assert_eq!(merged.servings, 6);
        assert_eq!(merged.id, original.id);
        assert_eq!(merged.name, original.name);
        assert_eq!(merged.ingredients, original.ingredients);
        assert_eq!(merged.instructions, original.instructions);
        assert_eq!(merged.prep_time, original.prep_time);
        assert_eq!(merged.created_at, original.created_at);
    }

    #[test]
    fn test_patch_apply_replaces_every_provided_field() {
        let existing = sample_recipe();

        let patch = RecipePatch {
            name: Some("Tiramisu".to_string()),
            description: Some("Coffee-flavored dessert".to_string()),
            ingredients: Some(vec!["Ladyfingers".to_string()]),
            instructions: Some(vec!["Layer ingredients".to_string()]),
            prep_time: Some(30),
            cook_time: Some(0),
            servings: Some(8),
            category_id: Some(Uuid::new_v4()),
        };
        let merged = patch.apply(existing);

        assert_eq!(merged.name, "Tiramisu");
        assert_eq!(merged.ingredients, vec!["Ladyfingers".to_string()]);
        assert_eq!(merged.cook_time, 0);
        assert_eq!(merged.servings, 8);
        assert!(merged.category_id.is_some());
    }

    #[test]
    fn test_rated_recipe_serializes_null_annotation() {
        let row = RatedRecipe {
            recipe: sample_recipe(),
            average_rating: None,
        };

        let value = serde_json::to_value(&row).unwrap();
        assert!(value["averageRating"].is_null());
        assert_eq!(value["name"], "Spaghetti Carbonara");
        assert_eq!(value["prepTime"], 10);
    }
}
