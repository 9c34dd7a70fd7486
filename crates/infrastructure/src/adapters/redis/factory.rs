use redis::Client;

use super::{RedisConfig, RedisConnection};
use crate::errors::InfraError;

/// Builds [`RedisConnection`]s from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RedisConnectionFactory;

impl RedisConnectionFactory {
    /// Creates the client only; the TCP connection is opened lazily by the
    /// first command.
    ///
    /// # Errors
    ///
    /// Returns `InfraError::Connection` if the Redis URL is invalid.
    pub fn create_client(config: &RedisConfig) -> Result<RedisConnection, InfraError> {
        let client = Client::open(config.url.as_str()).map_err(|error| {
            InfraError::cache_connection(format!("failed to create Redis client: {error}"))
        })?;

        Ok(RedisConnection::new(client, config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn valid_url_creates_connection_with_config() {
        let config = RedisConfig::with_url("redis://localhost:6379").with_key_prefix("test:");

        let connection = RedisConnectionFactory::create_client(&config).unwrap();

        assert_eq!(connection.config(), &config);
    }

    #[rstest]
    fn invalid_url_is_a_cache_connection_error() {
        let config = RedisConfig::with_url("not-a-redis-url");

        let error = RedisConnectionFactory::create_client(&config).unwrap_err();

        assert!(error.is_connection());
        assert!(error.concerns_cache());
    }
}
