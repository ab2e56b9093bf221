pub mod me;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the caller's own account (mounted at /api/user)
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/me",
        get(me::get_me).put(me::replace_me).patch(me::update_me),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(me::get_me, me::replace_me, me::update_me),
    components(schemas(me::MeResponse, me::UpdateMeRequest))
)]
pub struct ApiDoc;
