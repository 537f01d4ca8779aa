use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried on a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A competing team.
    #[serde(rename = "ROLE_USER")]
    User,
    /// An organizer who manages problems and runs hackathons.
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// All possible role values.
    pub const ALL: &'static [Role] = &[Self::User, Self::Admin];

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid role '{}'. Valid values: {}",
            self.invalid,
            Role::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" | "user" => Ok(Self::User),
            "ROLE_ADMIN" | "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}
