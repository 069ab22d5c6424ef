//! Storefront user roles.

use serde::{Deserialize, Serialize};

/// Role carried by an authenticated user's token.
///
/// Serialized in `SCREAMING_SNAKE_CASE` to match the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular shopper.
    #[default]
    Customer,
    /// Full access to the administrative dashboard.
    Admin,
    /// Store management access to the administrative dashboard.
    Manager,
    /// Content editor. No dashboard access.
    Editor,
    /// Customer support agent. No dashboard access.
    Support,
}

impl UserRole {
    /// All roles, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Customer,
        Self::Admin,
        Self::Manager,
        Self::Editor,
        Self::Support,
    ];

    /// Whether this role may enter the administrative dashboard.
    #[must_use]
    pub const fn can_access_admin(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// The wire name of the role (e.g. `MANAGER`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Editor => "EDITOR",
            Self::Support => "SUPPORT",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user role: {0}")]
pub struct InvalidRole(pub String);

impl std::str::FromStr for UserRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidRole(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_access_roles() {
        let allowed: Vec<_> = UserRole::ALL
            .into_iter()
            .filter(|r| r.can_access_admin())
            .collect();
        assert_eq!(allowed, vec![UserRole::Admin, UserRole::Manager]);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert_eq!("manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert!("ROOT".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&UserRole::Support).unwrap();
        assert_eq!(json, "\"SUPPORT\"");
        let role: UserRole = serde_json::from_str("\"EDITOR\"").unwrap();
        assert_eq!(role, UserRole::Editor);
        assert!(serde_json::from_str::<UserRole>("\"OWNER\"").is_err());
    }
}
