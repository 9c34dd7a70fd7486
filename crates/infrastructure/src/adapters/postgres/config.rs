//! PostgreSQL pool configuration.

use std::time::Duration;

// =============================================================================
// PostgresPoolConfig
// =============================================================================

/// Configuration for the PostgreSQL connection pool.
///
/// # Examples
///
/// ```
/// use rendezvous_infrastructure::adapters::postgres::PostgresPoolConfig;
/// use std::time::Duration;
///
/// let config = PostgresPoolConfig::with_url("postgres://localhost/rendezvous")
///     .with_max_connections(20)
///     .with_acquire_timeout(Duration::from_secs(3));
/// assert_eq!(config.max_connections, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresPoolConfig {
    /// Format: `postgres://[user[:password]@]host[:port]/database[?options]`
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,

    /// Maximum time to wait for a pooled connection.
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,
}

impl Default for PostgresPoolConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
        }
    }
}

// =============================================================================
// Builder Methods
// =============================================================================

impl PostgresPoolConfig {
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    #[must_use]
    pub const fn with_min_connections(mut self, min_connections: u32) -> Self {
        self.min_connections = min_connections;
        self
    }

    #[must_use]
    pub const fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
