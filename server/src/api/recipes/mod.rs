pub mod create;
pub mod delete;
pub mod get;
pub mod image;
pub mod list;
pub mod update;

use crate::api::{ApiError, MAX_TEXT_LEN};
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use bigdecimal::BigDecimal;
use utoipa::OpenApi;

/// Headroom over the image size limit for multipart framing
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Returns the router for recipe endpoints (mounted at /api/recipes/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::replace_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/image",
            post(image::upload_image).layer(DefaultBodyLimit::max(
                larder_core::MAX_FILE_SIZE + MULTIPART_OVERHEAD,
            )),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_recipes,
        create::create_recipe,
        get::get_recipe,
        update::replace_recipe,
        update::update_recipe,
        delete::delete_recipe,
        image::upload_image,
    ),
    components(schemas(
        list::RecipeSummary,
        get::RecipeDetailResponse,
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        image::UploadImageRequest,
        image::RecipeImageResponse,
    ))
)]
pub struct ApiDoc;

fn validate_time(time_minutes: i32) -> Result<i32, ApiError> {
    if time_minutes < 0 {
        return Err(ApiError::bad_request("time_minutes cannot be negative"));
    }
    Ok(time_minutes)
}

fn validate_price(price: &BigDecimal) -> Result<BigDecimal, ApiError> {
    Ok(larder_core::validate_price(price)?)
}

/// Blank links are stored as no link.
fn normalize_link(link: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(link) = link.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    if link.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "link must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }
    Ok(Some(link.to_string()))
}

/// Sort and de-duplicate relation ids from a request body.
fn normalize_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
