pub mod category_service;
pub mod rating_service;
pub mod recipe_service;
