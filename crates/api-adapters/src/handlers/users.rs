use axum::extract::State;
use axum::Json;
use domains::{AuthToken, User};
use services::{LoginInput, RegisterInput};

use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

/// `POST /api/users`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> Result<Json<AuthToken>, ApiError> {
    Ok(Json(state.accounts.register(input).await?))
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<Json<AuthToken>, ApiError> {
    Ok(Json(state.accounts.login(input).await?))
}

/// `GET /api/auth`
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.accounts.current_user(caller).await?))
}
