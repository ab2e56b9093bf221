use crate::api::{validate_name, ApiError, ErrorResponse, JsonBody};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::store;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::IngredientResponse;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIngredientRequest {
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/ingredients",
    tag = "ingredients",
    request_body(content = CreateIngredientRequest, example = json!({"name": "Cucumber"})),
    responses(
        (status = 201, description = "Ingredient created", body = IngredientResponse),
        (status = 400, description = "Blank or overlong name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    JsonBody(request): JsonBody<CreateIngredientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name("name", &request.name)?;

    let mut conn = pool.get()?;
    let ingredient = store::ingredients::create_ingredient(&mut conn, user.id, name)
        .map_err(|e| ApiError::internal("Failed to create ingredient", e))?;

    Ok((StatusCode::CREATED, Json(IngredientResponse::from(ingredient))))
}
