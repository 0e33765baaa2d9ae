//! API request handlers.

mod auth;
mod companies;
mod posts;
mod users;

use axum::Json;
use serde::Serialize;

pub use auth::{login, oauth_callback, oauth_login};
pub use companies::{create_company, delete_company, list_companies};
pub use posts::{create_post, get_post, list_user_posts};
pub use users::{
    create_user, delete_user, get_me, get_user, list_users, list_users_paginated, update_user,
};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
