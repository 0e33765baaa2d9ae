//! Post handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::post::{CreatePostRequest, Post};

/// Create a post authored by the caller.
#[instrument(skip(state, caller, request), fields(user_id = caller.id()))]
pub async fn create_post(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let post = state.posts.create_post(caller.id(), request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state))]
pub async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Post>> {
    let post = state
        .posts
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {id} not found")))?;
    Ok(Json(post))
}

/// List posts by one author.
#[instrument(skip(state))]
pub async fn list_user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Post>>> {
    if state.users.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found(format!("User {user_id} not found")));
    }
    Ok(Json(state.posts.posts_by_user(user_id).await?))
}
