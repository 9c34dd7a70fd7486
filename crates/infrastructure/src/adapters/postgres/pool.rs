use std::sync::Arc;

/// A PostgreSQL connection pool shared by every repository.
///
/// Cloning shares the same underlying `sqlx` pool.
#[derive(Clone)]
pub struct PostgresPool {
    inner: Arc<sqlx::PgPool>,
}

impl PostgresPool {
    #[must_use]
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            inner: Arc::new(pool),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub async fn close(&self) {
        self.inner.close().await;
    }

    #[must_use]
    pub fn as_inner(&self) -> &sqlx::PgPool {
        &self.inner
    }
}

impl From<sqlx::PgPool> for PostgresPool {
    fn from(pool: sqlx::PgPool) -> Self {
        Self::new(pool)
    }
}

impl std::fmt::Debug for PostgresPool {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PostgresPool")
            .field("is_closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
