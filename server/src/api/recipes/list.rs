use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store::{self, recipes::RecipeFilter, recipes::RecipeWithIds};
use axum::extract::{Query, State};
use axum::Json;
use bigdecimal::BigDecimal;
use larder_core::parse_id_list;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
    pub link: Option<String>,
    /// URL of the uploaded image
    pub image: Option<String>,
    pub tags: Vec<i32>,
    pub ingredients: Vec<i32>,
}

impl RecipeSummary {
    pub fn new(media: &MediaStore, row: RecipeWithIds) -> Self {
        let recipe = row.recipe;
        RecipeSummary {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price.with_scale(larder_core::price::DECIMAL_PLACES),
            link: recipe.link,
            image: recipe.image.as_deref().map(|path| media.url(path)),
            tags: row.tag_ids,
            ingredients: row.ingredient_ids,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Comma-separated tag ids; a recipe matches if it has any of them
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; a recipe matches if it has any of them
    pub ingredients: Option<String>,
}

impl ListRecipesParams {
    fn to_filter(&self) -> Result<RecipeFilter, ApiError> {
        Ok(RecipeFilter {
            tag_ids: match self.tags.as_deref() {
                Some(raw) => parse_id_list("tags", raw)?,
                None => Vec::new(),
            },
            ingredient_ids: match self.ingredients.as_deref() {
                Some(raw) => parse_id_list("ingredients", raw)?,
                None => Vec::new(),
            },
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "The caller's recipes, newest first", body = Vec<RecipeSummary>),
        (status = 400, description = "Malformed id list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    Query(params): Query<ListRecipesParams>,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    let filter = params.to_filter()?;

    let mut conn = pool.get()?;
    let rows = store::recipes::list_recipes(&mut conn, user.id, &filter)?;

    Ok(Json(
        rows.into_iter()
            .map(|row| RecipeSummary::new(&media, row))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_without_filters() {
        let filter = ListRecipesParams::default().to_filter().unwrap();
        assert_eq!(filter, RecipeFilter::default());
    }

    #[test]
    fn test_params_parse_both_lists() {
        let params = ListRecipesParams {
            tags: Some("4,2".to_string()),
            ingredients: Some("9".to_string()),
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.tag_ids, vec![2, 4]);
        assert_eq!(filter.ingredient_ids, vec![9]);
    }

    #[test]
    fn test_params_reject_garbage() {
        let params = ListRecipesParams {
            tags: Some("1,abc".to_string()),
            ingredients: None,
        };
        assert!(params.to_filter().is_err());
    }
}
