//! Role authorization middleware.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use log::{debug, warn};

use super::{AccessPolicy, AuthError, Clock, Principal, PrincipalStore, Role, TokenCodec};

/// Extract the token from an `Authorization` header value.
///
/// Accepts exactly `Bearer <token>`: case-sensitive scheme, one space, and
/// nothing after the token.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split(' ');

    let (Some("Bearer"), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::MalformedCredentials);
    };

    if token.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok(token)
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    codec: Arc<TokenCodec>,
    principals: Arc<dyn PrincipalStore>,
}

impl AuthState {
    pub fn new(codec: Arc<TokenCodec>, principals: Arc<dyn PrincipalStore>) -> Self {
        Self { codec, principals }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.codec.clock()
    }

    pub fn principals(&self) -> &Arc<dyn PrincipalStore> {
        &self.principals
    }

    /// Pair this state with a route policy for [`role_authorization`].
    pub fn guard(&self, policy: AccessPolicy) -> RouteGuard {
        RouteGuard {
            auth: self.clone(),
            policy: Arc::new(policy),
        }
    }

    /// Issue a session token for `principal`.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        Ok(self.codec.issue(principal)?)
    }
}

/// Middleware state for one protected route.
#[derive(Clone)]
pub struct RouteGuard {
    auth: AuthState,
    policy: Arc<AccessPolicy>,
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Principal as stored at request time.
    pub principal: Principal,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn is_admin(&self) -> bool {
        self.principal.role == Role::Admin
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Role authorization middleware.
///
/// Runs, in order and stopping at the first failure: header extraction,
/// bearer parsing, token verification, expiry check, principal lookup, policy
/// check against the stored role. On success `CurrentUser` is injected into
/// request extensions.
pub async fn role_authorization(
    State(guard): State<RouteGuard>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;
    let header = header
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)?;

    let token = bearer_token_from_header(header)?;

    let claims = guard.auth.codec.verify(token).map_err(|e| {
        debug!("rejecting token: {}", e);
        AuthError::from(e)
    })?;

    if claims.is_expired_at(guard.auth.clock().now()) {
        return Err(AuthError::ExpiredToken);
    }

    let principal = guard
        .auth
        .principals
        .find_by_id(claims.sub)
        .await
        .map_err(|e| AuthError::Storage(format!("{e:#}")))?
        .ok_or(AuthError::UnknownSubject)?;

    if !guard.policy.allows(principal.role) {
        warn!(
            "user {} with role {} denied, route requires {}",
            principal.id, principal.role, guard.policy
        );
        return Err(AuthError::InsufficientRole);
    }

    req.extensions_mut().insert(CurrentUser { principal });

    Ok(next.run(req).await)
}
