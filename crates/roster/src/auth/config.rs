//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Minimum accepted length of the signing secret.
pub const MIN_SECRET_LEN: usize = 32;

const INSECURE_SECRETS: &[&str] = &["secret", "changeme", "change-me-in-production-please-now"];

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric secret used to sign session tokens.
    /// Accepts a literal value or `env:VAR_NAME`.
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
        }
    }

    /// Resolve the JWT secret, expanding `env:VAR_NAME` syntax.
    /// Returns the resolved secret or None if not configured.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => match value.strip_prefix("env:") {
                Some(var_name) => match std::env::var(var_name) {
                    Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                    Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                    Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                },
                None => Ok(Some(value.clone())),
            },
        }
    }

    /// Resolve and check the secret, returning it ready for use.
    pub fn validated_secret(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if INSECURE_SECRETS.contains(&secret.as_str()) {
            return Err(ConfigValidationError::InsecureJwtSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }

        Ok(secret)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.validated_secret().map(|_| ())
    }

    /// Generate a random 64-character alphanumeric secret.
    pub fn generate_jwt_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingJwtSecret,
    InsecureJwtSecret,
    /// Shorter than [`MIN_SECRET_LEN`].
    JwtSecretTooShort,
    /// Referenced via `env:VAR_NAME` but not set.
    EnvVarNotFound(String),
    /// Referenced via `env:VAR_NAME` but empty.
    EnvVarEmpty(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingJwtSecret => write!(
                f,
                "JWT secret is required. Set ROSTER__AUTH__JWT_SECRET or auth.jwt_secret in config."
            ),
            Self::InsecureJwtSecret => write!(
                f,
                "JWT secret is a well-known placeholder. \
                 Run `roster init --force` or configure a random secret."
            ),
            Self::JwtSecretTooShort => write!(
                f,
                "JWT secret must be at least {} characters long.",
                MIN_SECRET_LEN
            ),
            Self::EnvVarNotFound(var) => write!(
                f,
                "Environment variable '{}' not found (referenced via env:{} in config).",
                var, var
            ),
            Self::EnvVarEmpty(var) => write!(
                f,
                "Environment variable '{}' is empty (referenced via env:{} in config).",
                var, var
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_default_has_no_secret() {
        let config = AuthConfig::default();
        assert!(config.jwt_secret.is_none());
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::MissingJwtSecret
        );
    }

    #[test]
    fn test_config_validation_insecure_secret() {
        let config = AuthConfig::with_secret("change-me-in-production-please-now");
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::InsecureJwtSecret
        );
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig::with_secret("tooshort");
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::JwtSecretTooShort
        );
    }

    #[test]
    fn test_config_validation_valid() {
        let config =
            AuthConfig::with_secret("a-very-long-and-secure-jwt-secret-that-is-at-least-32-chars");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_jwt_secret_passes_validation() {
        let secret = AuthConfig::generate_jwt_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secret, AuthConfig::generate_jwt_secret());

        assert!(AuthConfig::with_secret(secret).validate().is_ok());
    }

    #[test]
    fn test_resolve_jwt_secret_literal() {
        let config = AuthConfig::with_secret("my-literal-secret");
        assert_eq!(
            config.resolve_jwt_secret().unwrap(),
            Some("my-literal-secret".to_string())
        );
    }

    #[test]
    fn test_resolve_jwt_secret_env_var() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var(
                "ROSTER_TEST_JWT_SECRET_4821",
                "secret-from-env-var-at-least-32-chars",
            );
        }

        let config = AuthConfig::with_secret("env:ROSTER_TEST_JWT_SECRET_4821");
        assert_eq!(
            config.validated_secret().unwrap(),
            "secret-from-env-var-at-least-32-chars"
        );

        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("ROSTER_TEST_JWT_SECRET_4821");
        }
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_not_found() {
        let config = AuthConfig::with_secret("env:ROSTER_NONEXISTENT_VAR_4821");
        assert_eq!(
            config.resolve_jwt_secret().unwrap_err(),
            ConfigValidationError::EnvVarNotFound("ROSTER_NONEXISTENT_VAR_4821".to_string())
        );
    }

    #[test]
    fn test_resolve_jwt_secret_env_var_empty() {
        // SAFETY: test-only variable with a unique name
        unsafe {
            std::env::set_var("ROSTER_TEST_EMPTY_SECRET_4821", "");
        }

        let config = AuthConfig::with_secret("env:ROSTER_TEST_EMPTY_SECRET_4821");
        assert_eq!(
            config.resolve_jwt_secret().unwrap_err(),
            ConfigValidationError::EnvVarEmpty("ROSTER_TEST_EMPTY_SECRET_4821".to_string())
        );

        // SAFETY: cleaning up the variable set above
        unsafe {
            std::env::remove_var("ROSTER_TEST_EMPTY_SECRET_4821");
        }
    }
}
