//! User service for business logic.

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use super::models::{CreateUserRequest, PageQuery, UpdateUserRequest, User, UserPage};
use super::repository::UserRepository;
use crate::auth::Role;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Service for user management operations.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Create a new user with validation.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        if request.name.trim().is_empty() {
            bail!("Invalid name: must not be empty.");
        }

        if !is_valid_email(&request.email) {
            bail!("Invalid email format.");
        }

        if request.password.len() < MIN_PASSWORD_LEN {
            bail!("Password must be at least {} characters.", MIN_PASSWORD_LEN);
        }

        if !self.repo.is_email_available(&request.email).await? {
            bail!("Email '{}' is already registered.", request.email);
        }

        if let Some(company_id) = request.company_id {
            if !self.repo.company_exists(company_id).await? {
                bail!("Invalid company_id: company {} does not exist.", company_id);
            }
        }

        let mut processed_request = request;
        processed_request.password = hash_password(&processed_request.password)?;

        let user = self.repo.create(processed_request).await?;
        info!(user_id = user.id, role = %user.role, "Created new user");

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.repo.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn list_users_page(&self, query: PageQuery) -> Result<UserPage> {
        let (page, page_size) = query.normalized();
        let users = self.repo.list_page(page_size, query.offset()).await?;
        let total = self.repo.count().await?;

        Ok(UserPage {
            users: users.into_iter().map(Into::into).collect(),
            page,
            page_size,
            total,
        })
    }

    /// Update a user's name or email.
    #[instrument(skip(self, request))]
    pub async fn update_user(&self, id: i64, request: UpdateUserRequest) -> Result<User> {
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                bail!("Invalid name: must not be empty.");
            }
        }

        if let Some(email) = &request.email {
            if !is_valid_email(email) {
                bail!("Invalid email format.");
            }
            if let Some(existing) = self.repo.get_by_email(email).await? {
                if existing.id != id {
                    bail!("Email '{}' is already registered.", email);
                }
            }
        }

        let user = self.repo.update(id, request).await?;
        info!(user_id = user.id, "Updated user");

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn change_role(&self, id: i64, role: Role) -> Result<()> {
        self.repo.set_role(id, role).await?;
        warn!(user_id = id, role = %role, "Changed user role");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.repo.delete(id).await?;
        info!(user_id = id, "Deleted user");
        Ok(())
    }

    /// Check an email/password pair. `None` on any mismatch.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.repo.get_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.') && !email.contains(char::is_whitespace)
}

/// Hash a password using bcrypt.
fn hash_password(password: &str) -> Result<String> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash. Unparseable hashes never match.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    match bcrypt::verify(password, hash) {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_)) => Ok(false),
        Err(e) => Err(e).context("Failed to verify password"),
    }
}
