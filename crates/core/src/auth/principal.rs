use serde::{Deserialize, Serialize};

use crate::errors::{Audience, Error, Result};

/// Role of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parses a role from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The caller of a core operation, as established by the auth collaborator.
///
/// Core trusts the identity but performs its own ownership and role checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::User,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn audience(&self) -> Audience {
        if self.is_admin() {
            Audience::Admin
        } else {
            Audience::User
        }
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "user {} does not have the ADMIN role",
                self.user_id
            )))
        }
    }

    /// The caller must be `owner_id` itself; admins get no exemption.
    pub fn require_owner(&self, owner_id: &str) -> Result<()> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "user {} does not own this resource",
                self.user_id
            )))
        }
    }

    pub fn require_owner_or_admin(&self, owner_id: &str) -> Result<()> {
        if self.is_admin() {
            return Ok(());
        }
        self.require_owner(owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_checks() {
        let alice = Principal::user("alice");
        let admin = Principal::admin("root");

        assert!(alice.require_owner("alice").is_ok());
        assert!(alice.require_owner("bob").is_err());
        assert!(admin.require_owner("alice").is_err());
        assert!(admin.require_owner_or_admin("alice").is_ok());
        assert!(alice.require_admin().is_err());
    }

    #[test]
    fn test_role_db_round_trip() {
        assert_eq!(Role::from_db_str(Role::Admin.as_db_str()), Some(Role::Admin));
        assert_eq!(Role::from_db_str("root"), None);
    }
}
