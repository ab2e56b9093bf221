use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::store;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::TagResponse;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListTagsParams {
    /// When nonzero, only tags attached to at least one recipe
    pub assigned_only: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/recipes/tags",
    tag = "tags",
    params(ListTagsParams),
    responses(
        (status = 200, description = "The caller's tags, by name descending", body = Vec<TagResponse>),
        (status = 400, description = "Malformed assigned_only", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListTagsParams>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let assigned_only = match params.assigned_only.as_deref() {
        Some(raw) => larder_core::parse_flag("assigned_only", raw)?,
        None => false,
    };

    let mut conn = pool.get()?;
    let tags = store::tags::list_tags(&mut conn, user.id, assigned_only)
        .map_err(|e| ApiError::internal("Failed to fetch tags", e))?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}
