use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;
use rendezvous_workflow::ports::{EphemeralCache, WorkflowResult};

use super::RedisConnection;
use crate::errors::InfraError;

/// [`EphemeralCache`] over Redis string keys with `SET EX` expiry.
///
/// Failures are reported to the caller rather than swallowed.
#[derive(Clone, Debug)]
pub struct RedisEphemeralCache {
    connection: RedisConnection,
}

impl RedisEphemeralCache {
    #[must_use]
    pub const fn new(connection: RedisConnection) -> Self {
        Self { connection }
    }

    async fn run<T, F, Fut>(&self, operation: &str, key: &str, command: F) -> WorkflowResult<T>
    where
        F: FnOnce(redis::aio::ConnectionManager, String) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let full_key = self.connection.format_key(key);
        let response_timeout = self.connection.config().response_timeout;

        let outcome = async {
            let connection = self.connection.get_async_connection().await?;
            let pending = command(connection, full_key.clone());
            match tokio::time::timeout(response_timeout, pending).await {
                Ok(result) => result.map_err(InfraError::from),
                Err(_) => Err(InfraError::cache(format!(
                    "no response within {response_timeout:?}"
                ))),
            }
        }
        .await;

        outcome.map_err(|error| {
            tracing::warn!("Redis {} failed for key '{}': {}", operation, full_key, error);
            error.into_workflow(operation)
        })
    }
}

impl EphemeralCache for RedisEphemeralCache {
    async fn get(&self, key: &str) -> WorkflowResult<Option<String>> {
        self.run("get", key, |mut connection, full_key| async move {
            connection.get::<_, Option<String>>(full_key).await
        })
        .await
    }

    async fn set(&self, key: &str, value: String, time_to_live: Duration) -> WorkflowResult<()> {
        let seconds = time_to_live.as_secs().max(1);
        self.run("set", key, |mut connection, full_key| async move {
            connection.set_ex::<_, _, ()>(full_key, value, seconds).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> WorkflowResult<()> {
        self.run("delete", key, |mut connection, full_key| async move {
            connection.del::<_, i64>(full_key).await.map(|_| ())
        })
        .await
    }
}
