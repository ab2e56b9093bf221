use crate::api::ingredients::IngredientResponse;
use crate::api::tags::TagResponse;
use crate::api::{ApiError, ErrorResponse, PathParam};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store::{self, recipes::RecipeDetail};
use axum::extract::State;
use axum::Json;
use bigdecimal::BigDecimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Detail view: like the list view, with tags and ingredients nested.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
    pub link: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientResponse>,
}

impl RecipeDetailResponse {
    fn new(media: &MediaStore, detail: RecipeDetail) -> Self {
        let recipe = detail.recipe;
        RecipeDetailResponse {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price.with_scale(larder_core::price::DECIMAL_PLACES),
            link: recipe.link,
            image: recipe.image.as_deref().map(|path| media.url(path)),
            tags: detail.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeDetailResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<RecipeDetailResponse>, ApiError> {
    let mut conn = pool.get()?;
    let detail = store::recipes::get_recipe(&mut conn, user.id, id)?;

    Ok(Json(RecipeDetailResponse::new(&media, detail)))
}
