use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

// =============================================================================
// Identifier Definitions
// =============================================================================

/// Declares a positive 64-bit identifier newtype.
///
/// Record stores hand out sequential ids starting at 1, so zero and negative
/// values are rejected at construction.
macro_rules! define_identifier {
    ($(#[$meta:meta])* $name:ident, $entity_type:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            pub const ENTITY_TYPE: &'static str = $entity_type;

            pub fn new(value: i64) -> Result<Self, DomainError> {
                if value <= 0 {
                    return Err(DomainError::invalid_identifier($entity_type, value));
                }
                Ok(Self(value))
            }

            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(identifier: $name) -> Self {
                identifier.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(string: &str) -> Result<Self, Self::Err> {
                let value = string.trim().parse::<i64>().map_err(|_| {
                    DomainError::validation("identifier", format!("'{string}' is not an integer"))
                })?;
                Self::new(value)
            }
        }
    };
}

define_identifier!(UserIdentifier, "User");
define_identifier!(BuildingIdentifier, "Building");
define_identifier!(LocationIdentifier, "Location");
define_identifier!(EventIdentifier, "Event");
define_identifier!(RequestIdentifier, "Request");
define_identifier!(SurveyIdentifier, "Survey");
define_identifier!(SurveyQuestionIdentifier, "SurveyQuestion");
define_identifier!(SurveyAnswerIdentifier, "SurveyAnswer");

// =============================================================================
// Tests
// =============================================================================
