use crate::api::{validate_name, ApiError, ErrorResponse, JsonBody, PathParam};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store::{
    self,
    recipes::{RecipeUpdate, RelationUpdate},
};
use axum::{extract::State, Json};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::list::RecipeSummary;
use super::{normalize_ids, normalize_link, validate_price, validate_time};

/// Body for both PUT and PATCH. Which fields are required depends on the method.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    #[serde(default, deserialize_with = "larder_core::price::deserialize_option")]
    #[schema(value_type = Option<String>, example = "5.00")]
    pub price: Option<BigDecimal>,
    /// An empty string clears the link
    pub link: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateMode {
    /// PUT: scalar fields required, omitted relations are cleared
    Replace,
    /// PATCH: only supplied fields change
    Merge,
}

impl UpdateRecipeRequest {
    fn into_update(self, mode: UpdateMode) -> Result<RecipeUpdate, ApiError> {
        if mode == UpdateMode::Replace {
            for (field, present) in [
                ("title", self.title.is_some()),
                ("time_minutes", self.time_minutes.is_some()),
                ("price", self.price.is_some()),
            ] {
                if !present {
                    return Err(ApiError::bad_request(format!("{} is required", field)));
                }
            }
        }

        let relation = |ids: Option<Vec<i32>>| match (ids, mode) {
            (Some(ids), _) => RelationUpdate::Replace(normalize_ids(ids)),
            (None, UpdateMode::Replace) => RelationUpdate::Replace(Vec::new()),
            (None, UpdateMode::Merge) => RelationUpdate::Keep,
        };

        Ok(RecipeUpdate {
            title: self
                .title
                .as_deref()
                .map(|title| validate_name("title", title).map(str::to_string))
                .transpose()?,
            time_minutes: self.time_minutes.map(validate_time).transpose()?,
            price: self.price.as_ref().map(validate_price).transpose()?,
            link: match self.link.as_deref() {
                Some(link) => Some(normalize_link(Some(link))?),
                None => None,
            },
            tags: relation(self.tags),
            ingredients: relation(self.ingredients),
        })
    }
}

#[utoipa::path(
    put,
    path = "/api/recipes/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced; omitted tags/ingredients are cleared", body = RecipeSummary),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn replace_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    PathParam(id): PathParam<i32>,
    JsonBody(request): JsonBody<UpdateRecipeRequest>,
) -> Result<Json<RecipeSummary>, ApiError> {
    let update = request.into_update(UpdateMode::Replace)?;
    apply_update(&pool, &media, user.id, id, &update)
}

#[utoipa::path(
    patch,
    path = "/api/recipes/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Supplied fields updated", body = RecipeSummary),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    PathParam(id): PathParam<i32>,
    JsonBody(request): JsonBody<UpdateRecipeRequest>,
) -> Result<Json<RecipeSummary>, ApiError> {
    let update = request.into_update(UpdateMode::Merge)?;
    apply_update(&pool, &media, user.id, id, &update)
}

fn apply_update(
    pool: &DbPool,
    media: &MediaStore,
    owner: uuid::Uuid,
    id: i32,
    update: &RecipeUpdate,
) -> Result<Json<RecipeSummary>, ApiError> {
    let mut conn = pool.get()?;
    let updated = store::recipes::update_recipe(&mut conn, owner, id, update)?;
    Ok(Json(RecipeSummary::new(media, updated)))
}
