//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AuthState, IdentityProvider, OAuthStateStore, TokenCodec};
use crate::company::{CompanyRepository, CompanyService};
use crate::db::Database;
use crate::post::{PostRepository, PostService};
use crate::user::{UserRepository, UserService};

/// Third-party login wiring. Absent when no provider is configured.
#[derive(Clone)]
pub struct OAuthState {
    pub provider: Arc<dyn IdentityProvider>,
    pub states: Arc<OAuthStateStore>,
}

impl OAuthState {
    pub fn new(provider: Arc<dyn IdentityProvider>, states: Arc<OAuthStateStore>) -> Self {
        Self { provider, states }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub companies: CompanyService,
    pub posts: PostService,
    pub auth: AuthState,
    pub oauth: Option<OAuthState>,
    /// Origins allowed by CORS. Empty denies cross-origin requests.
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    /// Build the services over `db`. The user table doubles as the principal
    /// store for authorization.
    pub fn from_database(db: &Database, codec: Arc<TokenCodec>) -> Self {
        let pool = db.pool().clone();
        let user_repo = UserRepository::new(pool.clone());
        let auth = AuthState::new(codec, Arc::new(user_repo.clone()));

        Self {
            users: UserService::new(user_repo),
            companies: CompanyService::new(CompanyRepository::new(pool.clone())),
            posts: PostService::new(PostRepository::new(pool)),
            auth,
            oauth: None,
            allowed_origins: Arc::new(Vec::new()),
        }
    }

    pub fn with_oauth(mut self, oauth: OAuthState) -> Self {
        self.oauth = Some(oauth);
        self
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Arc::new(origins);
        self
    }
}
