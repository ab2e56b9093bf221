use crate::api::{validate_password, ApiError, ErrorResponse, JsonBody, MAX_TEXT_LEN};
use crate::db::DbPool;
use crate::store;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub email: String,
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/user/create",
    tag = "user",
    request_body(content = CreateUserRequest, example = json!({"email": "cook@example.com", "password": "secret1", "name": "Cook"})),
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid email, short password or email already taken", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(pool): State<Arc<DbPool>>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_password(&req.password)?;
    if req.name.trim().chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "name must be at most {} characters",
            MAX_TEXT_LEN
        )));
    }

    let mut conn = pool.get()?;
    let user = store::users::create_user(&mut conn, &req.email, &req.password, &req.name)?;

    tracing::info!(user_id = %user.id, "Created user");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            email: user.email,
            name: user.name,
        }),
    ))
}
