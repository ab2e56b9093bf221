use crate::api::{validate_name, validate_password, ApiError, ErrorResponse, JsonBody};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::models::User;
use crate::store::{self, users::UserUpdate};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    pub email: String,
    pub name: String,
    pub is_staff: bool,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        MeResponse {
            email: user.email,
            name: user.name,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/user/me",
    tag = "user",
    responses(
        (status = 200, description = "The authenticated user", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse::from(user))
}

#[utoipa::path(
    put,
    path = "/api/user/me",
    tag = "user",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Account replaced; email and password are required", body = MeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn replace_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    JsonBody(req): JsonBody<UpdateMeRequest>,
) -> Result<Json<MeResponse>, ApiError> {
    if req.email.is_none() {
        return Err(ApiError::bad_request("email is required"));
    }
    if req.password.is_none() {
        return Err(ApiError::bad_request("password is required"));
    }
    apply_update(&pool, &user, req)
}

#[utoipa::path(
    patch,
    path = "/api/user/me",
    tag = "user",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Supplied fields updated", body = MeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    JsonBody(req): JsonBody<UpdateMeRequest>,
) -> Result<Json<MeResponse>, ApiError> {
    apply_update(&pool, &user, req)
}

fn apply_update(
    pool: &DbPool,
    user: &User,
    req: UpdateMeRequest,
) -> Result<Json<MeResponse>, ApiError> {
    if let Some(password) = &req.password {
        validate_password(password)?;
    }
    // Blank names are allowed; only the length is checked.
    if let Some(name) = req.name.as_deref().filter(|n| !n.trim().is_empty()) {
        validate_name("name", name)?;
    }

    let update = UserUpdate {
        email: req.email.as_deref(),
        name: req.name.as_deref(),
        password: req.password.as_deref(),
    };

    let mut conn = pool.get()?;
    let updated = store::users::update_user(&mut conn, user.id, &update)?;

    Ok(Json(MeResponse::from(updated)))
}
