mod error;
pub mod ingredients;
pub mod public;
pub mod recipes;
pub mod tags;
pub mod user;

pub use error::{ApiError, JsonBody, PathParam};

use crate::AppState;
use axum::Router;
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Longest name, title or link accepted for a stored varchar column
pub const MAX_TEXT_LEN: usize = 255;

pub const MIN_PASSWORD_LEN: usize = 5;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Trim `raw` and reject it if blank or longer than [`MAX_TEXT_LEN`].
pub fn validate_name<'a>(field: &str, raw: &'a str) -> Result<&'a str, ApiError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{} may not be blank", field)));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(value)
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// All `/api` routes. Every route outside `public` authenticates through
/// the `AuthUser` extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(public::router())
        .nest("/api/user", user::router())
        .nest("/api/recipes/tags", tags::router())
        .nest("/api/recipes/ingredients", ingredients::router())
        .nest("/api/recipes/recipes", recipes::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Larder API", description = "Multi-tenant recipe catalog"),
        components(schemas(ErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        user::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
