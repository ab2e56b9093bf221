use crate::api::{validate_name, ApiError, ErrorResponse, JsonBody};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::store;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::TagResponse;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/tags",
    tag = "tags",
    request_body(content = CreateTagRequest, example = json!({"name": "Dessert"})),
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Blank or overlong name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_tag(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    JsonBody(request): JsonBody<CreateTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name("name", &request.name)?;

    let mut conn = pool.get()?;
    let tag = store::tags::create_tag(&mut conn, user.id, name)
        .map_err(|e| ApiError::internal("Failed to create tag", e))?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}
