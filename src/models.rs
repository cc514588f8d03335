pub mod category;
pub mod query;
pub mod rating;
pub mod recipe;

pub use category::{Category, CreateCategoryRequest};
pub use query::{
    ListRecipesQuery, Page, RecipeFilter, RecipeQuery, SearchRecipesQuery, SortBy, SortOrder,
};
pub use rating::{CreateRatingRequest, Rating, RatingAggregate};
pub use recipe::{
    CreateRecipeRequest, RatedRecipe, RatedRecipeListResponse, Recipe, RecipeDetail,
    RecipeListResponse, RecipeListing, RecipePatch, UpdateRecipeRequest,
};
