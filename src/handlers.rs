pub mod category_handlers;
pub mod rating_handlers;
pub mod recipe_handlers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response structure. Every failure surfaces as `{"error": ...}`,
/// optionally carrying extra diagnostics such as `recipeCount`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,

    /// Number of recipes blocking a category delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_count: Option<i64>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            recipe_count: None,
        }
    }

    pub fn with_recipe_count(error: &str, recipe_count: i64) -> Self {
        Self {
            error: error.to_string(),
            recipe_count: Some(recipe_count),
        }
    }
}

/// Shorthand for a 400 with the standard error body
pub(crate) fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}
