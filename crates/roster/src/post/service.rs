//! Post service.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{CreatePostRequest, Post};
use super::repository::PostRepository;

#[derive(Debug, Clone)]
pub struct PostService {
    repo: PostRepository,
}

impl PostService {
    pub fn new(repo: PostRepository) -> Self {
        Self { repo }
    }

    /// Create a post authored by `user_id`.
    #[instrument(skip(self, request))]
    pub async fn create_post(&self, user_id: i64, request: CreatePostRequest) -> Result<Post> {
        if request.title.trim().is_empty() {
            bail!("Invalid title: must not be empty.");
        }
        if request.body.trim().is_empty() {
            bail!("Invalid body: must not be empty.");
        }

        let post = self.repo.create(user_id, &request).await?;
        info!(post_id = post.id, user_id, "Created post");
        Ok(post)
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.repo.get(id).await
    }

    pub async fn posts_by_user(&self, user_id: i64) -> Result<Vec<Post>> {
        self.repo.list_for_user(user_id).await
    }
}
