use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::UserIdentifier;

// =============================================================================
// UserType
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    #[default]
    Student,
}

impl UserType {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// A campus member. Hosted and joined events are relations resolved by the
/// record store, not fields of the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub identifier: UserIdentifier,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

impl User {
    #[must_use]
    pub fn new(
        identifier: UserIdentifier,
        name: impl Into<String>,
        email: impl Into<String>,
        user_type: UserType,
    ) -> Self {
        Self {
            identifier,
            name: name.into(),
            email: email.into(),
            user_type,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(UserType::Admin, "admin")]
    #[case(UserType::Student, "student")]
    fn user_type_round_trips_through_text(#[case] user_type: UserType, #[case] text: &str) {
        assert_eq!(user_type.as_str(), text);
        assert_eq!(UserType::parse(text), Some(user_type));
    }

    #[rstest]
    fn unknown_user_type_is_rejected() {
        assert_eq!(UserType::parse("staff"), None);
    }

    #[rstest]
    fn only_admin_is_admin() {
        assert!(UserType::Admin.is_admin());
        assert!(!UserType::Student.is_admin());
    }
}
