use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::store;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::IngredientResponse;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListIngredientsParams {
    /// When nonzero, only ingredients attached to at least one recipe
    pub assigned_only: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "The caller's ingredients, by name descending", body = Vec<IngredientResponse>),
        (status = 400, description = "Malformed assigned_only", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListIngredientsParams>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let assigned_only = match params.assigned_only.as_deref() {
        Some(raw) => larder_core::parse_flag("assigned_only", raw)?,
        None => false,
    };

    let mut conn = pool.get()?;
    let ingredients = store::ingredients::list_ingredients(&mut conn, user.id, assigned_only)
        .map_err(|e| ApiError::internal("Failed to fetch ingredients", e))?;

    Ok(Json(ingredients.into_iter().map(IngredientResponse::from).collect()))
}
