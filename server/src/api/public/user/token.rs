use crate::api::{ApiError, ErrorResponse, JsonBody};
use crate::auth::create_session;
use crate::db::DbPool;
use crate::store;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/user/token",
    tag = "user",
    request_body(content = TokenRequest, example = json!({"email": "cook@example.com", "password": "secret1"})),
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn create_token(
    State(pool): State<Arc<DbPool>>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut conn = pool.get()?;

    let user = store::users::authenticate(&mut conn, &req.email, &req.password)?
        .ok_or_else(|| ApiError::bad_request("Unable to authenticate with provided credentials"))?;

    let token = create_session(&mut conn, user.id)
        .map_err(|e| ApiError::internal("Failed to create session", e))?;

    Ok(Json(TokenResponse { token }))
}
