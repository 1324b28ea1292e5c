//! Role reported by the account API at login.

use serde::{Deserialize, Serialize};

/// Role of the logged-in user.
///
/// The server decides which roles exist; unknown names are preserved
/// verbatim in [`UserRole::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// May add, edit and delete catalog entries.
    Admin,
    /// Read-only catalog access.
    Customer,
    Other(String),
}

impl UserRole {
    /// Whether this role is offered catalog write actions.
    #[must_use]
    pub const fn can_manage_catalog(&self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "Admin",
            Self::Customer => "Customer",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for UserRole {
    fn from(name: String) -> Self {
        if name.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else if name.eq_ignore_ascii_case("customer") {
            Self::Customer
        } else {
            Self::Other(name)
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
