use crate::api::{ApiError, ErrorResponse, PathParam};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::media::MediaStore;
use crate::store;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use larder_core::validate_image;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

const IMAGE_FIELD: &str = "image";

#[derive(ToSchema)]
pub struct UploadImageRequest {
    /// JPEG, PNG, GIF or WebP file
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: i32,
    /// URL the stored image is served from
    pub image: String,
}

#[utoipa::path(
    post,
    path = "/api/recipes/recipes/{id}/image",
    tag = "recipes",
    params(
        ("id" = i32, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Missing or invalid image", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    State(media): State<Arc<MediaStore>>,
    PathParam(id): PathParam<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeImageResponse>, ApiError> {
    {
        let mut conn = pool.get()?;
        store::recipes::find_recipe(&mut conn, user.id, id)?;
    }

    let data = read_image_field(multipart?).await?;
    let validated = validate_image(&data)?;

    let relative = MediaStore::recipe_image_path(validated.extension());
    media
        .save(&relative, &data)
        .await
        .map_err(|e| ApiError::internal("Failed to store image", e))?;

    let previous = {
        let mut conn = pool.get()?;
        store::recipes::set_recipe_image(&mut conn, user.id, id, &relative)
    };
    let previous = match previous {
        Ok(previous) => previous,
        Err(e) => {
            if let Err(cleanup) = media.remove(&relative).await {
                tracing::warn!(path = %relative, error = %cleanup, "Failed to remove orphaned image");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous {
        if let Err(e) = media.remove(&old).await {
            tracing::warn!(recipe_id = id, path = %old, error = %e, "Failed to remove replaced image");
        }
    }

    tracing::info!(
        recipe_id = id,
        path = %relative,
        content_type = validated.content_type(),
        width = validated.width,
        height = validated.height,
        "Stored recipe image"
    );

    Ok(Json(RecipeImageResponse {
        id,
        image: media.url(&relative),
    }))
}

/// Bytes of the first `image` field; other fields are skipped.
async fn read_image_field(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::bad_request("No image provided"))
}
