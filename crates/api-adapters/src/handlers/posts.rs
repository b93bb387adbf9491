use axum::extract::{Path, State};
use axum::Json;
use domains::{Like, Post};
use serde_json::{json, Value};
use services::TextInput;

use super::{comment_id, post_id};
use crate::error::ApiError;
use crate::extract::{AuthUser, JsonBody};
use crate::state::AppState;

/// `POST /api/posts`
pub async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    JsonBody(input): JsonBody<TextInput>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.posts.create_post(caller, input).await?))
}

/// `GET /api/posts`, newest first.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.posts.list_posts().await?))
}

/// `GET /api/posts/{id}`
pub async fn get(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let id = post_id(&raw)?;
    Ok(Json(state.posts.get_post(id).await?))
}

/// `DELETE /api/posts/{id}`: author only.
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = post_id(&raw)?;
    state.posts.delete_post(caller, id).await?;
    Ok(Json(json!({ "message": "Post removed" })))
}

/// `PUT /api/posts/{id}/likes`
pub async fn like(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let id = post_id(&raw)?;
    Ok(Json(state.posts.like_post(caller, id).await?))
}

/// `DELETE /api/posts/{id}/likes`
pub async fn unlike(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let id = post_id(&raw)?;
    Ok(Json(state.posts.unlike_post(caller, id).await?))
}

/// `POST /api/posts/{id}/comments`
pub async fn comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(raw): Path<String>,
    JsonBody(input): JsonBody<TextInput>,
) -> Result<Json<Post>, ApiError> {
    let id = post_id(&raw)?;
    Ok(Json(state.posts.add_comment(caller, id, input).await?))
}

/// `DELETE /api/posts/{id}/comments/{comment_id}`: comment author only.
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((raw_post, raw_comment)): Path<(String, String)>,
) -> Result<Json<Post>, ApiError> {
    let id = post_id(&raw_post)?;
    let comment = comment_id(&raw_comment)?;
    Ok(Json(state.posts.delete_comment(caller, id, comment).await?))
}
