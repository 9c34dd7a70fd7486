//! Error types for the workflow layer.
//!
//! # Error Categories
//!
//! - [`WorkflowError::NotFound`]: a referenced record does not exist
//! - [`WorkflowError::Validation`]: input rejected by a domain rule
//! - [`WorkflowError::Conflict`]: a state transition that is no longer allowed
//! - [`WorkflowError::Repository`]: record store failure
//! - [`WorkflowError::Cache`]: ephemeral cache failure
//!
//! A capacity refusal is not an error: acceptance reports it as `Ok(false)`.

use rendezvous_domain::common::DomainError;
use thiserror::Error;

// =============================================================================
// WorkflowError
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{entity_type} with identifier '{identifier}' not found")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation error: {0}")]
    Validation(DomainError),

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Repository error during {operation}: {message}")]
    Repository { operation: String, message: String },

    #[error("Cache error during {operation}: {message}")]
    Cache { operation: String, message: String },
}

// =============================================================================
// Factory Methods
// =============================================================================

impl WorkflowError {
    #[must_use]
    pub fn not_found(entity_type: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn repository(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Repository {
            operation: operation.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn cache(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Cache {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Query Methods
// =============================================================================

impl WorkflowError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Repository { .. } | Self::Cache { .. })
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DomainError> for WorkflowError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidTransition { .. } | DomainError::CapacityExceeded { .. } => {
                Self::conflict(error.to_string())
            }
            DomainError::InvalidIdentifier { .. } | DomainError::Validation { .. } => {
                Self::Validation(error)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
