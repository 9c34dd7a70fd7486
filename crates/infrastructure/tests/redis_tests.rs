//! Redis integration tests.
//!
//! # Requirements
//!
//! A Redis server reachable at `REDIS_URL` (default
//! `redis://localhost:6379`). Run with `cargo test -- --ignored`.

use std::time::Duration;

use rendezvous_infrastructure::adapters::redis::{
    RedisConfig, RedisConnectionFactory, RedisEphemeralCache,
};
use rendezvous_workflow::ports::EphemeralCache;
use rstest::rstest;

fn cache() -> RedisEphemeralCache {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_owned());
    let config = RedisConfig::with_url(url).with_key_prefix("test:rendezvous:");
    let connection =
        RedisConnectionFactory::create_client(&config).expect("Failed to create client");
    RedisEphemeralCache::new(connection)
}

#[rstest]
#[tokio::test]
#[ignore = "requires Redis"]
async fn value_round_trips_until_deleted() {
    let cache = cache();
    cache
        .set("activeEventsPages", "3".to_owned(), Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(
        cache.get("activeEventsPages").await.unwrap().as_deref(),
        Some("3")
    );

    cache.delete("activeEventsPages").await.unwrap();
    assert!(cache.get("activeEventsPages").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
#[ignore = "requires Redis"]
async fn value_expires_after_its_time_to_live() {
    let cache = cache();
    cache
        .set("activeEvents", "[]".to_owned(), Duration::from_secs(1))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert!(cache.get("activeEvents").await.unwrap().is_none());
}
