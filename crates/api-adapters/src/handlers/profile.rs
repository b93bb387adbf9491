use axum::extract::{Path, State};
use axum::Json;
use domains::{Profile, ProfileView};
use serde_json::{json, Value};
use services::{EducationInput, ExperienceInput, ProfileInput};

use super::{entry_id, user_id};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

/// `POST /api/profile`: create or update the caller's profile.
pub async fn upsert(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<ProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.profiles.upsert_profile(caller, input).await?))
}

/// `GET /api/profile/me`
pub async fn me(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(state.profiles.current_profile(caller).await?))
}

/// `GET /api/profile`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>, ApiError> {
    Ok(Json(state.profiles.list_profiles().await?))
}

/// `GET /api/profile/user/{user_id}`
pub async fn by_user(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let user = user_id(&raw)?;
    Ok(Json(state.profiles.profile_by_user(user).await?))
}

/// `DELETE /api/profile`: removes the profile and the account.
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.profiles.delete_account(caller).await?;
    Ok(Json(json!({ "message": "User deleted" })))
}

/// `PUT /api/profile/experience`
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<ExperienceInput>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.profiles.add_experience(caller, input).await?))
}

/// `DELETE /api/profile/experience/{exp_id}`
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let id = entry_id(&raw)?;
    Ok(Json(state.profiles.remove_experience(caller, id).await?))
}

/// `PUT /api/profile/education`
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<EducationInput>,
) -> Result<Json<Profile>, ApiError> {
    Ok(Json(state.profiles.add_education(caller, input).await?))
}

/// `DELETE /api/profile/education/{edu_id}`
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let id = entry_id(&raw)?;
    Ok(Json(state.profiles.remove_education(caller, id).await?))
}
