//! Resolved identities and the store they are resolved from.

use async_trait::async_trait;
use serde::Serialize;

use super::Role;

/// A user as seen by the authorization layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
    pub email: String,
}

/// Lookup of principals by id or email.
///
/// Implemented by the user repository; the middleware calls `find_by_id` once
/// per protected request.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Principal>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Principal>>;
}
