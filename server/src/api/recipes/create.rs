use crate::api::{validate_name, ApiError, ErrorResponse, JsonBody};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store::{self, recipes::RecipeFields};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::list::RecipeSummary;
use super::{normalize_ids, normalize_link, validate_price, validate_time};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    /// Number or decimal string, at most two decimal places
    #[serde(deserialize_with = "larder_core::price::deserialize")]
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
    #[serde(default)]
    pub link: Option<String>,
    /// Ids of the caller's tags
    #[serde(default)]
    pub tags: Vec<i32>,
    /// Ids of the caller's ingredients
    #[serde(default)]
    pub ingredients: Vec<i32>,
}

#[utoipa::path(
    post,
    path = "/api/recipes/recipes",
    tag = "recipes",
    request_body(content = CreateRecipeRequest, example = json!({"title": "Sample recipe", "time_minutes": 22, "price": "5.25", "tags": [1], "ingredients": [2, 3]})),
    responses(
        (status = 201, description = "Recipe created", body = RecipeSummary),
        (status = 400, description = "Invalid field or unknown tag/ingredient id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    JsonBody(request): JsonBody<CreateRecipeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = RecipeFields {
        title: validate_name("title", &request.title)?.to_string(),
        time_minutes: validate_time(request.time_minutes)?,
        price: validate_price(&request.price)?,
        link: normalize_link(request.link.as_deref())?,
    };
    let tag_ids = normalize_ids(request.tags);
    let ingredient_ids = normalize_ids(request.ingredients);

    let mut conn = pool.get()?;
    let created =
        store::recipes::create_recipe(&mut conn, user.id, &fields, &tag_ids, &ingredient_ids)?;

    Ok((StatusCode::CREATED, Json(RecipeSummary::new(&media, created))))
}
