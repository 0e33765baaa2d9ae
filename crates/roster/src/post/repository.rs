//! Post repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::{CreatePostRequest, Post};

const POST_COLUMNS: &str = "id, title, body, user_id, created_at";

#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, user_id: i64, request: &CreatePostRequest) -> Result<Post> {
        let result = sqlx::query("INSERT INTO posts (title, body, user_id) VALUES (?, ?, ?)")
            .bind(&request.title)
            .bind(&request.body)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to insert post")?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found after creation"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
        sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch post")
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE user_id = ? ORDER BY id");
        sqlx::query_as::<_, Post>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")
    }
}
