//! HTTP API module.
//!
//! REST endpoints for users, companies and posts, each guarded by a role
//! policy.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, OAuthState};
