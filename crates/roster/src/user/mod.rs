//! User management module.
//!
//! User CRUD, credential checks, and the [`PrincipalStore`](crate::auth::PrincipalStore)
//! the authorization middleware resolves callers from.

mod models;
mod repository;
mod service;

pub use models::{
    CreateUserRequest, DEFAULT_PAGE_SIZE, PageQuery, UpdateUserRequest, User, UserInfo, UserPage,
};
pub use repository::UserRepository;
pub use service::{MIN_PASSWORD_LEN, UserService};
