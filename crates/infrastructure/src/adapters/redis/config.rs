//! Redis connection configuration.

use std::time::Duration;

// =============================================================================
// RedisConfig
// =============================================================================

/// Configuration for the Redis cache connection.
///
/// # Examples
///
/// ```
/// use rendezvous_infrastructure::adapters::redis::RedisConfig;
/// use std::time::Duration;
///
/// let config = RedisConfig::with_url("redis://localhost:6379")
///     .with_key_prefix("prod:rendezvous:")
///     .with_response_timeout(Duration::from_secs(2));
/// assert_eq!(config.key_prefix, "prod:rendezvous:");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// Format: `redis://[user[:password]@]host[:port][/database]`
    pub url: String,

    /// Prepended to every logical key, e.g. `dev:rendezvous:activeEvents`.
    pub key_prefix: String,

    /// Maximum time to wait for a connection to be established.
    pub connection_timeout: Duration,

    /// Maximum time to wait for a single command.
    pub response_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: String::from("dev:rendezvous:"),
            connection_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Builder Methods
// =============================================================================

impl RedisConfig {
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    #[must_use]
    pub const fn with_connection_timeout(mut self, connection_timeout: Duration) -> Self {
        self.connection_timeout = connection_timeout;
        self
    }

    #[must_use]
    pub const fn with_response_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = response_timeout;
        self
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
    fn default_points_at_local_redis_with_dev_prefix() {
        let config = RedisConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.key_prefix, "dev:rendezvous:");
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn with_url_keeps_other_defaults() {
        let config = RedisConfig::with_url("redis://cache:6380/1");
        assert_eq!(config.url, "redis://cache:6380/1");
        assert_eq!(config.key_prefix, "dev:rendezvous:");
    }

    #[rstest]
    fn builder_chain() {
        let config = RedisConfig::with_url("redis://localhost:6379")
            .with_key_prefix("test:")
            .with_connection_timeout(Duration::from_secs(1))
            .with_response_timeout(Duration::from_millis(500));

        assert_eq!(config.key_prefix, "test:");
        assert_eq!(config.connection_timeout, Duration::from_secs(1));
        assert_eq!(config.response_timeout, Duration::from_millis(500));
    }
}
