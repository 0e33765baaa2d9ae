//! Test utilities and common setup.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use roster::api::{self, AppState, OAuthState};
use roster::auth::{
    Clock, IdentityProvider, ManualClock, OAuthError, OAuthStateStore, Principal, Role,
    TokenCodec, VerifiedIdentity,
};
use roster::db::Database;
use roster::user::{CreateUserRequest, User};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";
pub const PASSWORD: &str = "password123";
pub const START: i64 = 1_700_000_000;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";
pub const GUEST_EMAIL: &str = "guest@example.com";

/// Identity provider that answers from a fixed table of codes.
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://idp.test/authorize?client_id=roster&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError> {
        match code {
            "admin-code" => Ok(VerifiedIdentity {
                email: ADMIN_EMAIL.to_string(),
                name: Some("Ada Admin".to_string()),
            }),
            "stranger-code" => Ok(VerifiedIdentity {
                email: "stranger@example.com".to_string(),
                name: None,
            }),
            "unverified-code" => Err(OAuthError::UnverifiedEmail),
            _ => Err(OAuthError::Rejected {
                status: 400,
                body: "invalid_grant".to_string(),
            }),
        }
    }
}

/// A router over an in-memory database with one user per role.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub oauth_states: Arc<OAuthStateStore>,
    pub admin: User,
    pub user: User,
    pub guest: User,
}

impl TestApp {
    pub fn token_for(&self, user: &User) -> String {
        self.state.auth.issue_token(&user.principal()).unwrap()
    }

    /// Token carrying `role` for `id`, whatever the stored role is.
    pub fn token_with_role(&self, id: i64, role: Role) -> String {
        self.state
            .auth
            .issue_token(&Principal {
                id,
                role,
                email: String::new(),
            })
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }
}

async fn seed(state: &AppState, name: &str, email: &str, role: Role) -> User {
    state
        .users
        .create_user(CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role: Some(role),
            company_id: None,
        })
        .await
        .unwrap()
}

async fn build(with_oauth: bool) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let clock = Arc::new(ManualClock::new(START));
    let dyn_clock: Arc<dyn Clock> = clock.clone();

    let codec = TokenCodec::new(TEST_SECRET.as_bytes(), dyn_clock.clone());
    let oauth_states = Arc::new(OAuthStateStore::new(dyn_clock));

    let mut state = AppState::from_database(&db, Arc::new(codec));
    if with_oauth {
        state = state.with_oauth(OAuthState::new(Arc::new(StubProvider), oauth_states.clone()));
    }

    let admin = seed(&state, "Ada Admin", ADMIN_EMAIL, Role::Admin).await;
    let user = seed(&state, "Uma User", USER_EMAIL, Role::User).await;
    let guest = seed(&state, "Gus Guest", GUEST_EMAIL, Role::Guest).await;

    let router = api::create_router(state.clone()).unwrap();

    TestApp {
        router,
        state,
        clock,
        oauth_states,
        admin,
        user,
        guest,
    }
}

/// Create a test application with OAuth login enabled.
pub async fn test_app() -> TestApp {
    build(true).await
}

/// Create a test application without an identity provider.
pub async fn test_app_without_oauth() -> TestApp {
    build(false).await
}
