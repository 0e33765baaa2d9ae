//! User repository for database operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateUserRequest, UpdateUserRequest, User};
use crate::auth::{Principal, PrincipalStore, Role};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, company_id, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user. `request.password` must already be hashed.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let role = request.role.unwrap_or_default();

        debug!("Creating user: {} ({})", request.email, role);

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, role, company_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password)
        .bind(role.as_str())
        .bind(request.company_id)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")
    }

    #[instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users")
    }

    #[instrument(skip(self))]
    pub async fn list_page(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?");
        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list users page")
    }

    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(count)
    }

    /// Apply the non-empty fields of `request`.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {}", id))?;

        let mut updates = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(name) = request.name {
            updates.push("name = ?");
            values.push(name);
        }

        if let Some(email) = request.email {
            updates.push("email = ?");
            values.push(email);
        }

        if updates.is_empty() {
            return Ok(existing);
        }

        updates.push("updated_at = datetime('now')");

        let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

        let mut query_builder = sqlx::query(&sql);
        for value in &values {
            query_builder = query_builder.bind(value);
        }
        query_builder
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, id: i64, role: Role) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET role = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(role.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user role")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User not found: {}", id);
        }
        Ok(())
    }

    /// Delete a user. Their posts go with them.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("User not found: {}", id);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check email availability")?;
        Ok(row.is_none())
    }

    #[instrument(skip(self))]
    pub async fn company_exists(&self, company_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM companies WHERE id = ? LIMIT 1")
            .bind(company_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check company")?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl PrincipalStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Principal>> {
        Ok(self.get(id).await?.map(|user| user.principal()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        Ok(self.get_by_email(email).await?.map(|user| user.principal()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    fn request(name: &str, email: &str, role: Option<Role>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: "hashed_password".to_string(),
            role,
            company_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = repo().await;

        let user = repo
            .create(request("Test User", "test@example.com", None))
            .await
            .unwrap();
        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, Role::User);

        let fetched = repo.get(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);

        let by_email = repo
            .get_by_email("test@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.get(user.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = repo().await;
        repo.create(request("A", "dup@example.com", None))
            .await
            .unwrap();

        assert!(!repo.is_email_available("dup@example.com").await.unwrap());
        assert!(
            repo.create(request("B", "dup@example.com", None))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_update_user() {
        let repo = repo().await;
        let user = repo
            .create(request("Before", "before@example.com", None))
            .await
            .unwrap();

        let updated = repo
            .update(
                user.id,
                UpdateUserRequest {
                    name: Some("After".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.email, "before@example.com");

        let unchanged = repo
            .update(user.id, UpdateUserRequest::default())
            .await
            .unwrap();
        assert_eq!(unchanged.name, "After");

        assert!(
            repo.update(9999, UpdateUserRequest::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = repo().await;
        let user = repo
            .create(request("Gone", "gone@example.com", None))
            .await
            .unwrap();

        repo.delete(user.id).await.unwrap();
        assert!(repo.get(user.id).await.unwrap().is_none());

        let err = repo.delete(user.id).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_list_page_and_counts() {
        let repo = repo().await;
        for i in 0..5 {
            let role = if i == 0 { Some(Role::Admin) } else { None };
            repo.create(request(&format!("user{i}"), &format!("user{i}@example.com"), role))
                .await
                .unwrap();
        }

        assert_eq!(repo.list().await.unwrap().len(), 5);
        assert_eq!(repo.count().await.unwrap(), 5);

        let page = repo.list_page(2, 2).await.unwrap();
        let names: Vec<_> = page.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["user2", "user3"]);
    }

    #[tokio::test]
    async fn test_principal_store_reflects_role_changes() {
        let repo = repo().await;
        let user = repo
            .create(request("P", "p@example.com", Some(Role::Guest)))
            .await
            .unwrap();

        let principal = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(principal.role, Role::Guest);

        repo.set_role(user.id, Role::Admin).await.unwrap();
        let principal = repo.find_by_email("p@example.com").await.unwrap().unwrap();
        assert_eq!(principal.role, Role::Admin);

        assert!(repo.find_by_id(4242).await.unwrap().is_none());
    }
}
