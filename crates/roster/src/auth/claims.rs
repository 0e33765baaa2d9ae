//! Session token claims and user roles.

use serde::{Deserialize, Serialize};

/// User role.
///
/// Closed set. Route policies are built from these values and the stored
/// role of a user is always one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrator.
    Admin,
    /// Regular user.
    #[default]
    User,
    /// Read-mostly visitor.
    Guest,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Role; 3] = [Role::Admin, Role::User, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "guest" => Ok(Role::Guest),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Claims carried by a session token.
///
/// All three fields are required; a token missing any of them, or carrying
/// a role outside [`Role`], fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: i64,

    /// Role at issuance. Advisory only: authorization uses the stored role.
    pub role: Role,

    /// Expiration time (Unix seconds).
    pub exp: i64,
}

impl Claims {
    /// Whether the token is past its expiry at `now` (Unix seconds).
    ///
    /// A token is still valid at exactly `exp`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Guest.to_string(), "guest");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("User".parse::<Role>().unwrap(), Role::User);
        assert_eq!("GUEST".parse::<Role>().unwrap(), Role::Guest);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(role, Role::Guest);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_claims_require_all_fields() {
        let ok: Claims =
            serde_json::from_str(r#"{"sub": 7, "role": "user", "exp": 1700000000}"#).unwrap();
        assert_eq!(ok.sub, 7);
        assert_eq!(ok.role, Role::User);

        assert!(serde_json::from_str::<Claims>(r#"{"sub": 7, "role": "user"}"#).is_err());
        assert!(
            serde_json::from_str::<Claims>(r#"{"sub": "7", "role": "user", "exp": 1}"#).is_err()
        );
        assert!(
            serde_json::from_str::<Claims>(r#"{"sub": 7, "role": "owner", "exp": 1}"#).is_err()
        );
    }

    #[test]
    fn test_claims_expiry_boundary() {
        let claims = Claims {
            sub: 1,
            role: Role::Admin,
            exp: 1_000,
        };
        assert!(!claims.is_expired_at(999));
        assert!(!claims.is_expired_at(1_000));
        assert!(claims.is_expired_at(1_001));
    }
}
