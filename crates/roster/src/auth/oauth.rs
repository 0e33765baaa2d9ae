//! Third-party login via the OAuth 2.0 authorization-code flow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Clock;

/// How long a login `state` value stays redeemable.
pub const STATE_TTL_SECS: i64 = 10 * 60;

/// Upper bound on unexpired login `state` values held at once.
pub const MAX_PENDING_STATES: usize = 10_000;

/// OAuth provider configuration. Endpoint defaults target Google.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Callback URL registered with the provider.
    pub redirect_url: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_userinfo_url")]
    pub userinfo_url: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_auth_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

fn default_scopes() -> Vec<String> {
    vec!["openid".to_string(), "email".to_string(), "profile".to_string()]
}

/// Identity asserted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
}

/// Errors that can occur during the OAuth flow.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("identity provider request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("identity provider rejected the exchange ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("identity provider returned no verified email")]
    UnverifiedEmail,
}

/// Exchanges authorization codes for verified identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL to send the browser to, carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    /// OpenID Connect spelling.
    email_verified: Option<bool>,
    /// Legacy Google v2 spelling.
    verified_email: Option<bool>,
}

impl UserInfo {
    fn into_identity(self) -> Result<VerifiedIdentity, OAuthError> {
        let verified = self.email_verified.or(self.verified_email).unwrap_or(true);
        match self.email {
            Some(email) if verified && !email.is_empty() => Ok(VerifiedIdentity {
                email,
                name: self.name,
            }),
            _ => Err(OAuthError::UnverifiedEmail),
        }
    }
}

/// Standard authorization-code provider over HTTP.
#[derive(Debug, Clone)]
pub struct OAuth2Provider {
    client: Client,
    config: OAuthConfig,
}

impl OAuth2Provider {
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthError> {
        let client = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self { client, config })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(OAuthError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl IdentityProvider for OAuth2Provider {
    fn authorize_url(&self, state: &str) -> String {
        let scope = self.config.scopes.join(" ");
        let separator = if self.config.auth_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.config.auth_url,
            separator,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_url),
            urlencoding::encode(&scope),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;
        let token: TokenResponse = Self::check(response).await?.json().await?;

        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        let info: UserInfo = Self::check(response).await?.json().await?;

        info.into_identity()
    }
}

/// One-time `state` values for in-flight logins.
pub struct OAuthStateStore {
    states: DashMap<String, i64>,
    clock: Arc<dyn Clock>,
    max_pending: usize,
}

impl OAuthStateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(clock, MAX_PENDING_STATES)
    }

    pub fn with_capacity(clock: Arc<dyn Clock>, max_pending: usize) -> Self {
        Self {
            states: DashMap::new(),
            clock,
            max_pending,
        }
    }

    /// Mint a fresh state value.
    ///
    /// Returns `None` when `max_pending` unexpired values are outstanding.
    pub fn issue(&self) -> Option<String> {
        let now = self.clock.now();
        self.states.retain(|_, expires_at| *expires_at >= now);
        if self.states.len() >= self.max_pending {
            return None;
        }

        let state = nanoid::nanoid!(32);
        self.states.insert(state.clone(), now + STATE_TTL_SECS);
        Some(state)
    }

    /// Redeem `state`. Succeeds at most once per issued value.
    pub fn consume(&self, state: &str) -> bool {
        match self.states.remove(state) {
            Some((_, expires_at)) => expires_at >= self.clock.now(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
