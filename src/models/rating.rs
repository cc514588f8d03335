use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Rating entity attached to a recipe. Ratings are append-only: they are
/// created and deleted, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for rating a recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "rating": 5,
    "comment": "Delicious!"
}))]
pub struct CreateRatingRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(minimum = 1, maximum = 5, example = 5)]
    pub rating: i32,

    pub comment: Option<String>,
}

/// Derived (average, count) pair for a recipe's ratings, never persisted.
/// A recipe with no ratings reports an average of 0 and a count of 0 here;
/// the collection endpoints represent the same absence as a null annotation
/// instead (see [`crate::models::recipe::RatedRecipe`]).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    #[schema(example = 4.3)]
    pub average_rating: f64,
    #[schema(example = 3)]
    pub rating_count: i64,
}
