use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Sort keys accepted by the recipe listing endpoint. `Rating` sorts by the
/// derived average rating and requires joining the aggregate subquery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    CreatedAt,
    Name,
    PrepTime,
    CookTime,
    Rating,
}

impl SortBy {
    pub fn column(self) -> &'static str {
        match self {
            SortBy::CreatedAt => "r.created_at",
            SortBy::Name => "r.name",
            SortBy::PrepTime => "r.prep_time",
            SortBy::CookTime => "r.cook_time",
            SortBy::Rating => "agg.average_rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query string accepted by `GET /recipes`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRecipesQuery {
    /// Page size, defaults to 10
    pub limit: Option<i64>,
    /// Rows to skip, defaults to 0
    pub offset: Option<i64>,
    /// Sort key, defaults to createdAt
    pub sort_by: Option<SortBy>,
    /// Sort direction, defaults to desc
    pub order: Option<SortOrder>,
}

/// Query string accepted by `GET /recipes/search`. At least one filter must
/// be active; a blank `q` and a zero `minRating` both count as absent.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchRecipesQuery {
    /// Case-insensitive substring match against recipe names
    pub q: Option<String>,
    /// Exact category id match
    pub category: Option<Uuid>,
    /// Minimum average rating, 0 means no filter
    pub min_rating: Option<i32>,
}

impl SearchRecipesQuery {
    /// The minimum-rating filter is only active for thresholds above zero.
    pub fn wants_rating_filter(&self) -> bool {
        self.min_rating.unwrap_or(0) > 0
    }
}

/// A single typed filter clause. Clauses are ANDed together in the order
/// they were added.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeFilter {
    /// Case-insensitive substring match against the recipe name
    NameContains(String),
    /// Exact category id match
    CategoryIs(Uuid),
    /// Average rating at or above the threshold. Recipes with no ratings
    /// pass: absence of ratings must not be conflated with a low rating.
    MinAverageRating(i32),
}

impl RecipeFilter {
    fn needs_aggregate(&self) -> bool {
        matches!(self, RecipeFilter::MinAverageRating(_))
    }

    fn render(&self, param: usize) -> String {
        match self {
            RecipeFilter::NameContains(_) => format!("r.name ILIKE ${}", param),
            RecipeFilter::CategoryIs(_) => format!("r.category_id = ${}", param),
            RecipeFilter::MinAverageRating(_) => format!(
                "(agg.average_rating >= ${} OR agg.average_rating IS NULL)",
                param
            ),
        }
    }
}

/// LIMIT/OFFSET pair applied after filtering and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Composed recipe query: filters, then sort, then pagination. Renders the
/// SELECT statement; the repository binds the parameters in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeQuery {
    pub filters: Vec<RecipeFilter>,
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub page: Option<Page>,
}

impl RecipeQuery {
    /// Whether the query must join the per-recipe rating aggregate, either
    /// to sort by it or to filter on it.
    pub fn needs_aggregate(&self) -> bool {
        self.sort_by == SortBy::Rating || self.filters.iter().any(RecipeFilter::needs_aggregate)
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::from(
            "SELECT r.id, r.name, r.description, r.ingredients, r.instructions, \
             r.prep_time, r.cook_time, r.servings, r.category_id, r.created_at, r.updated_at, ",
        );

        if self.needs_aggregate() {
            sql.push_str("agg.average_rating");
        } else {
            sql.push_str("NULL::float8 AS average_rating");
        }

        sql.push_str(" FROM recipes r");

        if self.needs_aggregate() {
            sql.push_str(
                " LEFT JOIN (SELECT recipe_id, ROUND(AVG(rating)::numeric, 1)::float8 \
                 AS average_rating FROM ratings GROUP BY recipe_id) agg \
                 ON agg.recipe_id = r.id",
            );
        }

        let mut param = 0;
        let mut conditions = Vec::new();
        for filter in &self.filters {
            param += 1;
            conditions.push(filter.render(param));
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql.push_str(&format!(
            " ORDER BY {} {}",
            self.sort_by.column(),
            self.order.keyword()
        ));

        // Unrated recipes trail the ranking in both directions
        if self.sort_by == SortBy::Rating {
            sql.push_str(" NULLS LAST");
        }

        if self.page.is_some() {
            sql.push_str(&format!(" LIMIT ${} OFFSET ${}", param + 1, param + 2));
        }

        sql
    }
}

/// Builds an ILIKE pattern matching the needle anywhere in the column,
/// escaping LIKE metacharacters so the needle matches literally.
pub fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_query() -> RecipeQuery {
        RecipeQuery {
            filters: Vec::new(),
            sort_by: SortBy::CreatedAt,
            order: SortOrder::Desc,
            page: None,
        }
    }

    #[test]
    fn test_default_listing_skips_aggregate_join() {
        let query = RecipeQuery {
            page: Some(Page {
                limit: 10,
                offset: 0,
            }),
            ..plain_query()
        };

        let sql = query.to_sql();
        assert!(!sql.contains("LEFT JOIN"));
        assert!(sql.contains("NULL::float8 AS average_rating"));
        assert!(sql.contains("ORDER BY r.created_at DESC"));
        assert!(sql.ends_with("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_rating_sort_joins_aggregate_with_nulls_last() {
        let query = RecipeQuery {
            sort_by: SortBy::Rating,
            order: SortOrder::Desc,
            page: Some(Page {
                limit: 10,
                offset: 0,
            }),
            ..plain_query()
        };

        let sql = query.to_sql();
        assert!(sql.contains("LEFT JOIN"));
        assert!(sql.contains("GROUP BY recipe_id"));
        assert!(sql.contains("ORDER BY agg.average_rating DESC NULLS LAST"));
    }

    #[test]
    fn test_rating_sort_ascending_also_trails_nulls() {
        let query = RecipeQuery {
            sort_by: SortBy::Rating,
            order: SortOrder::Asc,
            ..plain_query()
        };

        let sql = query.to_sql();
        assert!(sql.contains("ORDER BY agg.average_rating ASC NULLS LAST"));
    }

    #[test]
    fn test_non_rating_sorts_have_no_nulls_clause() {
        for sort_by in [SortBy::Name, SortBy::PrepTime, SortBy::CookTime] {
            let query = RecipeQuery {
                sort_by,
                ..plain_query()
            };
            assert!(!query.to_sql().contains("NULLS LAST"));
        }
    }

    #[test]
    fn test_filters_are_anded_in_order() {
        let category_id = Uuid::new_v4();
        let query = RecipeQuery {
            filters: vec![
                RecipeFilter::NameContains("pasta".to_string()),
                RecipeFilter::CategoryIs(category_id),
                RecipeFilter::MinAverageRating(3),
            ],
            ..plain_query()
        };

        let sql = query.to_sql();
        assert!(sql.contains(
            "WHERE r.name ILIKE $1 AND r.category_id = $2 \
             AND (agg.average_rating >= $3 OR agg.average_rating IS NULL)"
        ));
    }

    #[test]
    fn test_min_rating_filter_forces_aggregate_join() {
        let query = RecipeQuery {
            filters: vec![RecipeFilter::MinAverageRating(4)],
            ..plain_query()
        };

        assert!(query.needs_aggregate());
        assert!(query.to_sql().contains("LEFT JOIN"));
    }

    #[test]
    fn test_pagination_params_follow_filter_params() {
        let query = RecipeQuery {
            filters: vec![RecipeFilter::NameContains("cake".to_string())],
            page: Some(Page {
                limit: 5,
                offset: 10,
            }),
            ..plain_query()
        };

        assert!(query.to_sql().ends_with("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("pasta"), "%pasta%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_wants_rating_filter_ignores_zero() {
        let base = SearchRecipesQuery {
            q: None,
            category: None,
            min_rating: None,
        };
        assert!(!base.wants_rating_filter());

        let zero = SearchRecipesQuery {
            min_rating: Some(0),
            ..base.clone()
        };
        assert!(!zero.wants_rating_filter());

        let active = SearchRecipesQuery {
            min_rating: Some(3),
            ..base
        };
        assert!(active.wants_rating_filter());
    }
}
