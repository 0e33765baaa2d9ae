//! Session token issuance and verification.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::debug;
use thiserror::Error;

use super::{AuthConfig, Claims, Clock, ConfigValidationError, Principal};

/// Lifetime of an issued token.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Token codec failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Unparseable, disallowed algorithm, or claims of the wrong shape.
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

/// Signs and verifies HMAC session tokens.
///
/// Only the HMAC family is accepted on decode. Expiry is checked against the
/// injected clock with zero leeway.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is enforced against `clock`, not the library's wall clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Build a codec from validated configuration.
    pub fn from_config(
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigValidationError> {
        let secret = config.validated_secret()?;
        Ok(Self::new(secret.as_bytes(), clock))
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Issue an HS256 token for `principal`, valid for [`TOKEN_TTL_SECS`].
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let claims = Claims {
            sub: principal.id,
            role: principal.role,
            exp: self.clock.now() + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, shape and expiry of `token`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("token decode failed: {:?}", e);
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if data.claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
