//! Domain error types.
//!
//! # Error Categories
//!
//! - [`DomainError::InvalidIdentifier`]: an identifier outside the positive range
//! - [`DomainError::Validation`]: a field value violating an entity rule
//! - [`DomainError::InvalidTransition`]: a status change that is not allowed
//! - [`DomainError::CapacityExceeded`]: admitting a guest into a full event

use thiserror::Error;

// =============================================================================
// DomainError
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{entity_type} identifier must be positive, got {value}")]
    InvalidIdentifier {
        entity_type: &'static str,
        value: i64,
    },

    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity_type} cannot transition from {from} to {to}")]
    InvalidTransition {
        entity_type: &'static str,
        from: String,
        to: String,
    },

    #[error("Event is full ({guest_count}/{max_guest_count})")]
    CapacityExceeded {
        guest_count: u32,
        max_guest_count: u32,
    },
}

// =============================================================================
// Factory Methods
// =============================================================================

impl DomainError {
    #[must_use]
    pub const fn invalid_identifier(entity_type: &'static str, value: i64) -> Self {
        Self::InvalidIdentifier { entity_type, value }
    }

    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_transition(
        entity_type: &'static str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity_type,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[must_use]
    pub const fn capacity_exceeded(guest_count: u32, max_guest_count: u32) -> Self {
        Self::CapacityExceeded {
            guest_count,
            max_guest_count,
        }
    }
}

// =============================================================================
// Query Methods
// =============================================================================

impl DomainError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidIdentifier { .. })
    }

    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    #[must_use]
    pub const fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
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
    fn invalid_identifier_message() {
        let error = DomainError::invalid_identifier("Event", -3);
        assert_eq!(error.to_string(), "Event identifier must be positive, got -3");
        assert!(error.is_validation());
    }

    #[rstest]
    fn validation_message_names_field() {
        let error = DomainError::validation("title", "must not be empty");
        assert_eq!(error.to_string(), "Invalid title: must not be empty");
    }

    #[rstest]
    fn invalid_transition_message() {
        let error = DomainError::invalid_transition("Request", "Accepted", "Rejected");
        assert_eq!(
            error.to_string(),
            "Request cannot transition from Accepted to Rejected"
        );
        assert!(error.is_invalid_transition());
        assert!(!error.is_validation());
    }

    #[rstest]
    fn capacity_exceeded_message() {
        let error = DomainError::capacity_exceeded(5, 5);
        assert_eq!(error.to_string(), "Event is full (5/5)");
        assert!(error.is_capacity_exceeded());
    }
}
