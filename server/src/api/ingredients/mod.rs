pub mod create;
pub mod list;

use crate::models::Ingredient;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        IngredientResponse {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// Returns the router for ingredient endpoints (mounted at /api/recipes/ingredients)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_ingredients).post(create::create_ingredient))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_ingredients, create::create_ingredient),
    components(schemas(IngredientResponse, create::CreateIngredientRequest))
)]
pub struct ApiDoc;
