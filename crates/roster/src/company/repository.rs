//! Company repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

use super::models::Company;

#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<Company> {
        let result = sqlx::query("INSERT INTO companies (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to insert company")?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| anyhow::anyhow!("Company not found after creation"))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<Company>> {
        sqlx::query_as::<_, Company>("SELECT id, name, created_at FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch company")
    }

    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Company>> {
        sqlx::query_as::<_, Company>("SELECT id, name, created_at FROM companies WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch company by name")
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Company>> {
        sqlx::query_as::<_, Company>("SELECT id, name, created_at FROM companies ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list companies")
    }

    /// Delete a company. Members keep their accounts with no company.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete company")?;

        if result.rows_affected() == 0 {
            anyhow::bail!("Company not found: {}", id);
        }
        Ok(())
    }
}
