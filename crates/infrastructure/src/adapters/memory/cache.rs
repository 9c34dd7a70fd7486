use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rendezvous_workflow::ports::{EphemeralCache, WorkflowResult};
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// `None` when the time-to-live runs past the clock's range.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Process-local [`EphemeralCache`] with per-entry expiry.
///
/// Expiry is measured on the tokio clock, so paused-time tests can step
/// past it with `tokio::time::advance`. Expired entries are dropped lazily
/// on the next read of their key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEphemeralCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl InMemoryEphemeralCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EphemeralCache for InMemoryEphemeralCache {
    async fn get(&self, key: &str) -> WorkflowResult<Option<String>> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if !entry.is_live(Instant::now()) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, time_to_live: Duration) -> WorkflowResult<()> {
        self.entries.lock().insert(
            key.to_owned(),
            Entry {
                value,
                expires_at: Instant::now().checked_add(time_to_live),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> WorkflowResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
