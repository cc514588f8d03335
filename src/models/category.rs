use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Category entity classifying recipes by cuisine or course
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Request payload for creating a new category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "name": "Italian",
    "description": "Italian cuisine"
}))]
pub struct CreateCategoryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Category name is required"),
        custom(function = "validate_not_blank")
    )]
    #[schema(min_length = 1, max_length = 100, example = "Italian")]
    pub name: String,

    pub description: Option<String>,
}
