//! Process configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `STORE_BACKEND` | `postgres` (`memory` for the in-process store and cache) |
//! | `DATABASE_URL` | required for `postgres` |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |
//! | `REDIS_URL` | `redis://localhost:6379` |
//! | `CACHE_KEY_PREFIX` | `dev:rendezvous:` |
//! | `APP_HOST` / `APP_PORT` | `0.0.0.0` / `3000` |
//! | `ACTIVE_EVENTS_TTL_SECONDS` | `30`, between 1 and 86400 |
//! | `EVENTS_PER_PAGE` | `9` |
//! | `SWEEP_INTERVAL_SECONDS` | `60`, `0` disables the sweep, at most 86400 |

use std::str::FromStr;
use std::time::Duration;

use rendezvous_workflow::workflows::ListingSettings;
use thiserror::Error;

use crate::server::ServerConfig;

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_KEY_PREFIX: &str = "dev:rendezvous:";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;
const MAX_PERIOD_SECONDS: u64 = 86_400;

// =============================================================================
// ConfigError
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name}='{value}' is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn missing(name: &'static str) -> Self {
        Self::Missing { name }
    }

    #[must_use]
    pub fn invalid(
        name: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            name,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// StoreBackend
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL record store with the Redis cache.
    #[default]
    Postgres,
    /// Process-local store and cache; nothing survives a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" | "in_memory" => Ok(Self::Memory),
            _ => Err(ConfigError::invalid(
                "STORE_BACKEND",
                value,
                "expected 'postgres' or 'memory'",
            )),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: String,
    pub cache_key_prefix: String,
    pub listing: ListingSettings,
    /// `None` disables the periodic sweep.
    pub sweep_interval: Option<Duration>,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unparsable values, or when `DATABASE_URL`
    /// is missing for the `postgres` backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let backend = read("STORE_BACKEND")
            .map(|value| value.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or_default();
        let database_url = read("DATABASE_URL");
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::missing("DATABASE_URL"));
        }

        let defaults = ServerConfig::default();
        let server = ServerConfig::new(
            read("APP_HOST").unwrap_or(defaults.host),
            parse(&read, "APP_PORT")?.unwrap_or(defaults.port),
        );

        let listing_defaults = ListingSettings::default();
        let page_size =
            parse::<usize>(&read, "EVENTS_PER_PAGE")?.unwrap_or(listing_defaults.page_size);
        if page_size == 0 {
            return Err(ConfigError::invalid("EVENTS_PER_PAGE", "0", "must be positive"));
        }
        let time_to_live = match parse::<u64>(&read, "ACTIVE_EVENTS_TTL_SECONDS")? {
            Some(seconds) => {
                Duration::from_secs(bounded("ACTIVE_EVENTS_TTL_SECONDS", seconds, 1)?)
            }
            None => listing_defaults.time_to_live,
        };
        let sweep_seconds = match parse::<u64>(&read, "SWEEP_INTERVAL_SECONDS")? {
            Some(seconds) => bounded("SWEEP_INTERVAL_SECONDS", seconds, 0)?,
            None => DEFAULT_SWEEP_INTERVAL_SECONDS,
        };

        Ok(Self {
            server,
            backend,
            database_url,
            database_max_connections: parse(&read, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            redis_url: read("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_owned()),
            cache_key_prefix: read("CACHE_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_owned()),
            listing: ListingSettings {
                page_size,
                time_to_live,
            },
            sweep_interval: (sweep_seconds > 0).then(|| Duration::from_secs(sweep_seconds)),
        })
    }
}

/// Checks `minimum <= seconds <= MAX_PERIOD_SECONDS`.
fn bounded(name: &'static str, seconds: u64, minimum: u64) -> Result<u64, ConfigError> {
    if (minimum..=MAX_PERIOD_SECONDS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(ConfigError::invalid(
            name,
            seconds.to_string(),
            format!("must be between {minimum} and {MAX_PERIOD_SECONDS} seconds"),
        ))
    }
}

fn parse<T>(
    read: &impl Fn(&str) -> Option<String>, name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    read(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|error| ConfigError::invalid(name, value.clone(), error.to_string()))
        })
        .transpose()
}

// =============================================================================
// Tests
// =============================================================================
