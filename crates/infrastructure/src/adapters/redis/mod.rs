//! Redis-backed ephemeral cache.

mod cache;
mod config;
mod connection;
mod factory;

pub use cache::RedisEphemeralCache;
pub use config::RedisConfig;
pub use connection::RedisConnection;
pub use factory::RedisConnectionFactory;
