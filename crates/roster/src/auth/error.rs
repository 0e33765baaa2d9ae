//! Authentication and authorization errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::Serialize;
use thiserror::Error;

use super::TokenError;

/// Authentication errors.
///
/// Display strings are returned to clients verbatim, so they stay generic.
/// Details travel in the variant payload and are only logged.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`.
    #[error("invalid token format")]
    MalformedCredentials,

    #[error("invalid or expired token")]
    InvalidToken(String),

    #[error("invalid or expired token")]
    InvalidSignature,

    #[error("token expired")]
    ExpiredToken,

    /// Token verified but its subject no longer exists.
    #[error("user not found")]
    UnknownSubject,

    #[error("insufficient role")]
    InsufficientRole,

    #[error("failed to issue token")]
    SigningFailure(String),

    /// Login-time lookup (e.g. OAuth email) found no account.
    #[error("no user exists with this email")]
    PrincipalNotFound,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("internal authorization error")]
    Storage(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidToken(_)
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::UnknownSubject
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::PrincipalNotFound => StatusCode::NOT_FOUND,
            AuthError::SigningFailure(_) | AuthError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_auth_header",
            AuthError::MalformedCredentials => "invalid_auth_header",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::ExpiredToken => "token_expired",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::SigningFailure(_) => "signing_failure",
            AuthError::PrincipalNotFound => "user_not_found",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Storage(_) => "internal_error",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::InvalidSignature => AuthError::InvalidSignature,
            TokenError::Malformed(detail) => AuthError::InvalidToken(detail),
            TokenError::Signing(detail) => AuthError::SigningFailure(detail),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::SigningFailure(detail) | AuthError::Storage(detail) => {
                error!("{}: {}", self.error_code(), detail);
            }
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display_is_generic() {
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "missing authorization header"
        );
        assert_eq!(
            AuthError::InvalidToken("InvalidAlgorithm".to_string()).to_string(),
            "invalid or expired token"
        );
        assert_eq!(
            AuthError::Storage("disk I/O error".to_string()).to_string(),
            "internal authorization error"
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::UnknownSubject.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::PrincipalNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::InsufficientRole.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::SigningFailure(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_error_mapping() {
        assert!(matches!(
            AuthError::from(TokenError::Expired),
            AuthError::ExpiredToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::InvalidSignature),
            AuthError::InvalidSignature
        ));
        assert!(matches!(
            AuthError::from(TokenError::Malformed("x".into())),
            AuthError::InvalidToken(_)
        ));
    }

    #[tokio::test]
    async fn test_auth_error_response_body() {
        let response = AuthError::InsufficientRole.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "insufficient role");
        assert_eq!(json["error_code"], "insufficient_role");
    }
}
