use crate::api::{ApiError, ErrorResponse, PathParam};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store;
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/recipes/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, ApiError> {
    let image = {
        let mut conn = pool.get()?;
        store::recipes::delete_recipe(&mut conn, user.id, id)?
    };

    if let Some(path) = image {
        if let Err(e) = media.remove(&path).await {
            tracing::warn!(recipe_id = id, path = %path, error = %e, "Failed to remove recipe image");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
