pub mod create;
pub mod list;

use crate::models::Tag;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        TagResponse {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Returns the router for tag endpoints (mounted at /api/recipes/tags)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_tags).post(create::create_tag))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_tags, create::create_tag),
    components(schemas(TagResponse, create::CreateTagRequest))
)]
pub struct ApiDoc;
