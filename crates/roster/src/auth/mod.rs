//! Authentication and authorization.
//!
//! Session tokens are HMAC-signed JWTs issued at login. Every protected route
//! carries an [`AccessPolicy`]; [`role_authorization`] verifies the bearer
//! token, re-reads the user from storage and checks the stored role against
//! that policy.

mod claims;
mod clock;
mod config;
mod error;
mod middleware;
pub mod oauth;
mod policy;
mod principal;
mod token;

pub use claims::{Claims, Role};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, ConfigValidationError, MIN_SECRET_LEN};
pub use error::{AuthError, ErrorResponse};
pub use middleware::{AuthState, CurrentUser, RouteGuard, role_authorization};
pub use oauth::{
    IdentityProvider, OAuth2Provider, OAuthConfig, OAuthError, OAuthStateStore, VerifiedIdentity,
};
pub use policy::{AccessPolicy, PolicyError, authorize};
pub use principal::{Principal, PrincipalStore};
pub use token::{TOKEN_TTL_SECS, TokenCodec, TokenError};
