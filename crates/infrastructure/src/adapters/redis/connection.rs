use std::sync::Arc;

use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;

use super::RedisConfig;
use crate::errors::InfraError;

// =============================================================================
// RedisConnection
// =============================================================================

/// Shared handle to one managed Redis connection.
///
/// The connection is opened on first use and then cloned for every command;
/// the manager reconnects on its own after a dropped connection.
#[derive(Clone)]
pub struct RedisConnection {
    client: Arc<redis::Client>,
    config: Arc<RedisConfig>,
    manager: Arc<OnceCell<ConnectionManager>>,
}

// =============================================================================
// Constructors
// =============================================================================

impl RedisConnection {
    #[must_use]
    pub fn new(client: redis::Client, config: RedisConfig) -> Self {
        Self {
            client: Arc::new(client),
            config: Arc::new(config),
            manager: Arc::new(OnceCell::new()),
        }
    }
}

// =============================================================================
// Connection Operations
// =============================================================================

impl RedisConnection {
    /// # Errors
    ///
    /// Returns `InfraError::Connection` if Redis cannot be reached within the
    /// configured connection timeout.
    pub async fn get_async_connection(&self) -> Result<ConnectionManager, InfraError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let connecting = ConnectionManager::new(self.client.as_ref().clone());
                match tokio::time::timeout(self.config.connection_timeout, connecting).await {
                    Ok(result) => result.map_err(InfraError::from),
                    Err(_) => Err(InfraError::cache_connection(format!(
                        "no connection within {:?}",
                        self.config.connection_timeout
                    ))),
                }
            })
            .await?;
        Ok(manager.clone())
    }

    #[must_use]
    pub fn format_key(&self, suffix: &str) -> String {
        format!("{}{}", self.config.key_prefix, suffix)
    }

    #[must_use]
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

impl std::fmt::Debug for RedisConnection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RedisConnection")
            .field("url", &self.config.url)
            .field("key_prefix", &self.config.key_prefix)
            .field("connected", &self.manager.initialized())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn create_test_connection(key_prefix: &str) -> RedisConnection {
        let client =
            redis::Client::open("redis://localhost:6379").expect("Failed to create client");
        let config = RedisConfig::with_url("redis://localhost:6379").with_key_prefix(key_prefix);
        RedisConnection::new(client, config)
    }

    #[rstest]
    #[case("dev:rendezvous:", "activeEvents", "dev:rendezvous:activeEvents")]
    #[case("dev:rendezvous:", "", "dev:rendezvous:")]
    #[case("", "activeEventsPages", "activeEventsPages")]
    fn format_key_prepends_prefix(
        #[case] prefix: &str,
        #[case] suffix: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(create_test_connection(prefix).format_key(suffix), expected);
    }

    #[rstest]
    fn debug_does_not_connect() {
        let connection = create_test_connection("dev:rendezvous:");
        let debug_string = format!("{connection:?}");
        assert!(debug_string.contains("connected: false"));
    }
}
