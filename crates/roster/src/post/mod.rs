//! Posts authored by users.

mod models;
mod repository;
mod service;

pub use models::{CreatePostRequest, Post};
pub use repository::PostRepository;
pub use service::PostService;
