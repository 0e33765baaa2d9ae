//! User handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::CurrentUser;
use crate::user::{CreateUserRequest, PageQuery, UpdateUserRequest, UserInfo, UserPage};

/// Create a new user.
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(user))))
}

/// List all users.
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserInfo>>> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// List users one page at a time.
#[instrument(skip(state))]
pub async fn list_users_paginated(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<UserPage>> {
    Ok(Json(state.users.list_users_page(query).await?))
}

/// Get a user by ID.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserInfo>> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {id} not found")))?;
    Ok(Json(user.into()))
}

/// Update a user. Non-admins may only update themselves.
#[instrument(skip(state, caller, request), fields(caller_id = caller.id()))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserInfo>> {
    if !caller.is_admin() && caller.id() != id {
        return Err(ApiError::forbidden("You can only update your own account"));
    }

    let user = state.users.update_user(id, request).await?;
    Ok(Json(user.into()))
}

/// Delete a user.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.users.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the calling user.
#[instrument(skip(state, caller), fields(user_id = caller.id()))]
pub async fn get_me(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> ApiResult<Json<UserInfo>> {
    let user = state
        .users
        .get_user(caller.id())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", caller.id())))?;
    Ok(Json(user.into()))
}
