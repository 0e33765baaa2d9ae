//! Route access policies.

use std::collections::HashSet;

use thiserror::Error;

use super::Role;

/// Whether `actual` is one of the `required` roles. An empty set denies.
pub fn authorize(required: &HashSet<Role>, actual: Role) -> bool {
    required.contains(&actual)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("access policy must name at least one role")]
    Empty,
}

/// Non-empty set of roles allowed on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    roles: HashSet<Role>,
}

impl AccessPolicy {
    /// Build a policy allowing any of `roles`.
    pub fn one_of(roles: impl IntoIterator<Item = Role>) -> Result<Self, PolicyError> {
        let roles: HashSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(PolicyError::Empty);
        }
        Ok(Self { roles })
    }

    /// Policy allowing every role. Still requires a valid session.
    pub fn any_role() -> Self {
        Self {
            roles: Role::ALL.into_iter().collect(),
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        authorize(&self.roles, role)
    }
}

impl std::fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        names.sort_unstable();
        write!(f, "{{{}}}", names.join(", "))
    }
}
