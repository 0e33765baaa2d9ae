//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::{Principal, Role};

/// Default page size for paginated listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// User entity from database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub company_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            email: self.email.clone(),
        }
    }
}

/// Public user info (safe to return to clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub company_id: Option<i64>,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            company_id: user.company_id,
            created_at: user.created_at,
        }
    }
}

/// Request to create a new user.
///
/// `password` is plaintext on the way in; the service replaces it with a
/// bcrypt hash before it reaches the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub company_id: Option<i64>,
}

/// Request to update a user's profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// Page and page size with non-positive or missing values replaced by
    /// 1 and [`DEFAULT_PAGE_SIZE`].
    pub fn normalized(&self) -> (i64, i64) {
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = self
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        (page, page_size)
    }

    pub fn offset(&self) -> i64 {
        let (page, page_size) = self.normalized();
        (page - 1).saturating_mul(page_size)
    }
}

/// One page of users.
#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserInfo>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
}
