use rendezvous_workflow::errors::WorkflowError;

use super::PostgresPool;
use crate::errors::InfraError;

const SCHEMA: &str = include_str!("../../../migrations/0001_schema.sql");

// =============================================================================
// PostgresRecordStore
// =============================================================================

/// PostgreSQL-backed record store.
///
/// One value implements every repository port; the implementations live in
/// the sibling modules, one per port.
#[derive(Clone, Debug)]
pub struct PostgresRecordStore {
    pool: PostgresPool,
}

impl PostgresRecordStore {
    #[must_use]
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    /// Creates missing tables and indexes. Safe to run on every start.
    ///
    /// # Errors
    ///
    /// Returns `InfraError::Database` if a statement fails.
    pub async fn apply_schema(&self) -> Result<(), InfraError> {
        sqlx::raw_sql(SCHEMA).execute(self.pool.as_inner()).await?;
        tracing::info!("Database schema is up to date");
        Ok(())
    }
}

/// Maps an adapter failure into the workflow error for `operation`,
/// logging it on the way.
pub(super) fn failure<E>(operation: &'static str) -> impl FnOnce(E) -> WorkflowError
where
    E: Into<InfraError>,
{
    move |error| {
        let error: InfraError = error.into();
        tracing::error!("PostgreSQL {} failed: {}", operation, error);
        error.into_workflow(operation)
    }
}

/// Converts a non-negative identifier list into bind parameters.
pub(super) fn bind_identifiers<T>(identifiers: &[T]) -> Vec<i64>
where
    T: Copy + Into<i64>,
{
    identifiers.iter().map(|identifier| (*identifier).into()).collect()
}
