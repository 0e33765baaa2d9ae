//! Company service.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{Company, CreateCompanyRequest};
use super::repository::CompanyRepository;

#[derive(Debug, Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
}

impl CompanyService {
    pub fn new(repo: CompanyRepository) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_company(&self, request: CreateCompanyRequest) -> Result<Company> {
        let name = request.name.trim();
        if name.is_empty() {
            bail!("Invalid company name: must not be empty.");
        }
        if self.repo.get_by_name(name).await?.is_some() {
            bail!("Company '{}' already exists.", name);
        }

        let company = self.repo.create(name).await?;
        info!(company_id = company.id, "Created company");
        Ok(company)
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn delete_company(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        info!(company_id = id, "Deleted company");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::user::{CreateUserRequest, UserRepository};

    async fn setup() -> (CompanyService, UserRepository) {
        let db = Database::in_memory().await.unwrap();
        (
            CompanyService::new(CompanyRepository::new(db.pool().clone())),
            UserRepository::new(db.pool().clone()),
        )
    }

    fn named(name: &str) -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (service, _) = setup().await;
        service.create_company(named("  Acme  ")).await.unwrap();
        service.create_company(named("Globex")).await.unwrap();

        let names: Vec<String> = service
            .list_companies()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Acme", "Globex"]);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, _) = setup().await;
        assert!(service.create_company(named(" ")).await.is_err());

        service.create_company(named("Acme")).await.unwrap();
        let err = service.create_company(named("Acme")).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_delete_detaches_members() {
        let (service, users) = setup().await;
        let company = service.create_company(named("Initech")).await.unwrap();
        let member = users
            .create(CreateUserRequest {
                name: "Peter".to_string(),
                email: "peter@initech.com".to_string(),
                password: "hash".to_string(),
                role: None,
                company_id: Some(company.id),
            })
            .await
            .unwrap();

        service.delete_company(company.id).await.unwrap();

        let member = users.get(member.id).await.unwrap().unwrap();
        assert_eq!(member.company_id, None);

        let err = service.delete_company(company.id).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
