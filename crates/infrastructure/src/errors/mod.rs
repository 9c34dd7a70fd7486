//! Infrastructure error types.
//!
//! # Error Categories
//!
//! - [`InfraError::Database`]: SQLx database operation failures
//! - [`InfraError::Cache`]: Redis cache operation failures
//! - [`InfraError::Serialization`]: JSON serialization failures
//! - [`InfraError::Integrity`]: a stored row that does not form a valid entity
//! - [`InfraError::Connection`]: Database or cache connection failures
//! - [`InfraError::Timeout`]: Operation timeout errors
//! - [`InfraError::Configuration`]: Configuration errors
//!
//! Adapters convert these into `WorkflowError` at the port boundary with
//! [`InfraError::into_workflow`].
//!
//! # Examples
//!
//! ```
//! use rendezvous_infrastructure::errors::InfraError;
//!
//! let error = InfraError::database("connection refused");
//! assert!(error.is_database());
//!
//! let workflow_error = error.into_workflow("find_event");
//! assert!(workflow_error.is_infrastructure());
//! ```

use rendezvous_domain::common::DomainError;
use rendezvous_workflow::errors::WorkflowError;
use thiserror::Error;

// =============================================================================
// ConnectionTarget
// =============================================================================

/// Target system for connection errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionTarget {
    Database,
    Cache,
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(formatter, "database"),
            Self::Cache => write!(formatter, "cache"),
        }
    }
}

// =============================================================================
// InfraError
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum InfraError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Stored {entity_type} is invalid: {message}")]
    Integrity {
        entity_type: &'static str,
        message: String,
    },

    #[error("Connection to {target} failed: {message}")]
    Connection {
        target: ConnectionTarget,
        message: String,
    },

    #[error("Operation timed out: {message}")]
    Timeout { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

// =============================================================================
// Factory Methods
// =============================================================================

impl InfraError {
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn integrity(entity_type: &'static str, message: impl Into<String>) -> Self {
        Self::Integrity {
            entity_type,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database_connection(message: impl Into<String>) -> Self {
        Self::Connection {
            target: ConnectionTarget::Database,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn cache_connection(message: impl Into<String>) -> Self {
        Self::Connection {
            target: ConnectionTarget::Cache,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// =============================================================================
// Query Methods
// =============================================================================

impl InfraError {
    #[must_use]
    pub const fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    #[must_use]
    pub const fn is_cache(&self) -> bool {
        matches!(self, Self::Cache { .. })
    }

    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }

    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the failure came from the ephemeral cache rather than the
    /// record store.
    #[must_use]
    pub const fn concerns_cache(&self) -> bool {
        matches!(
            self,
            Self::Cache { .. }
                | Self::Connection {
                    target: ConnectionTarget::Cache,
                    ..
                }
        )
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl InfraError {
    /// Converts into the workflow error reported for `operation`.
    #[must_use]
    pub fn into_workflow(self, operation: &str) -> WorkflowError {
        if self.concerns_cache() {
            WorkflowError::cache(operation, self.to_string())
        } else {
            WorkflowError::repository(operation, self.to_string())
        }
    }
}

impl From<sqlx::Error> for InfraError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::PoolTimedOut => Self::Timeout {
                message: "database pool connection timed out".to_string(),
            },
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed => Self::Connection {
                target: ConnectionTarget::Database,
                message: error.to_string(),
            },
            _ => Self::Database {
                message: error.to_string(),
            },
        }
    }
}

impl From<redis::RedisError> for InfraError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_connection_refusal() || error.is_io_error() {
            Self::Connection {
                target: ConnectionTarget::Cache,
                message: error.to_string(),
            }
        } else if error.is_timeout() {
            Self::Cache {
                message: format!("Redis operation timed out: {error}"),
            }
        } else {
            Self::Cache {
                message: error.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON: {error}"),
        }
    }
}

impl From<DomainError> for InfraError {
    fn from(error: DomainError) -> Self {
        let entity_type = match &error {
            DomainError::InvalidIdentifier { entity_type, .. }
            | DomainError::InvalidTransition { entity_type, .. } => *entity_type,
            DomainError::Validation { .. } | DomainError::CapacityExceeded { .. } => "Record",
        };
        Self::integrity(entity_type, error.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod classification {
        use super::*;

        #[rstest]
        #[case(InfraError::cache("WRONGTYPE"), true)]
        #[case(InfraError::cache_connection("refused"), true)]
        #[case(InfraError::database("deadlock"), false)]
        #[case(InfraError::database_connection("refused"), false)]
        #[case(InfraError::timeout("pool"), false)]
        fn concerns_cache(#[case] error: InfraError, #[case] expected: bool) {
            assert_eq!(error.concerns_cache(), expected);
        }

        #[rstest]
        fn cache_failures_become_cache_workflow_errors() {
            let error = InfraError::cache_connection("refused").into_workflow("get");
            assert!(matches!(error, WorkflowError::Cache { .. }));
        }

        #[rstest]
        fn store_failures_become_repository_workflow_errors() {
            let error = InfraError::database("deadlock").into_workflow("accept_request");
            assert_eq!(
                error,
                WorkflowError::repository("accept_request", "Database error: deadlock")
            );
        }
    }

    mod conversions {
        use super::*;

        #[rstest]
        fn from_sqlx_pool_timed_out() {
            let infra_error: InfraError = sqlx::Error::PoolTimedOut.into();
            assert!(infra_error.is_timeout());
        }

        #[rstest]
        fn from_sqlx_row_not_found_is_database() {
            let infra_error: InfraError = sqlx::Error::RowNotFound.into();
            assert!(infra_error.is_database());
        }

        #[rstest]
        fn from_serde_json_error() {
            let json_error = serde_json::from_str::<String>("invalid").unwrap_err();
            let infra_error: InfraError = json_error.into();

            assert!(infra_error.is_serialization());
            assert!(infra_error.to_string().contains("JSON"));
        }

        #[rstest]
        fn from_domain_error_is_integrity() {
            let infra_error: InfraError = DomainError::invalid_identifier("Event", 0).into();

            assert!(infra_error.is_integrity());
            assert!(infra_error.to_string().starts_with("Stored Event is invalid"));
        }
    }
}
