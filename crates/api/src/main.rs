use rendezvous_api::config::{AppConfig, StoreBackend};
use rendezvous_api::routes::create_router;
use rendezvous_api::server::{Server, spawn_sweeper};
use rendezvous_api::state::{AppState, RecordStore};
use rendezvous_domain::user::UserType;
use rendezvous_infrastructure::SystemClock;
use rendezvous_infrastructure::adapters::memory::{InMemoryEphemeralCache, InMemoryRecordStore};
use rendezvous_infrastructure::adapters::postgres::{
    PostgresPoolConfig, PostgresPoolFactory, PostgresRecordStore,
};
use rendezvous_infrastructure::adapters::redis::{
    RedisConfig, RedisConnectionFactory, RedisEphemeralCache,
};
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(backend = ?config.backend, "Rendezvous - Starting Server");

    match config.backend {
        StoreBackend::Postgres => {
            let store = create_postgres_store(&config).await?;
            let cache = create_redis_cache(&config)?;
            let state = AppState::new(store, cache, SystemClock, config.listing);
            serve(&config, state).await
        }
        StoreBackend::Memory => {
            let store = seed_campus()?;
            let state = AppState::new(
                store,
                InMemoryEphemeralCache::new(),
                SystemClock,
                config.listing,
            );
            serve(&config, state).await
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rendezvous_api=debug,tower_http=debug,info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .init();
    }
}

async fn serve<Store, Cache, Time>(
    config: &AppConfig,
    state: AppState<Store, Cache, Time>,
) -> anyhow::Result<()>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let server = Server::new(config.server.clone());
    let sweeper = config
        .sweep_interval
        .map(|period| spawn_sweeper(state.clone(), period, server.shutdown_receiver()));

    let result = server.run(create_router(state)).await;

    if let Some(sweeper) = sweeper {
        sweeper.await?;
    }
    result
}

async fn create_postgres_store(config: &AppConfig) -> anyhow::Result<PostgresRecordStore> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool_config =
        PostgresPoolConfig::with_url(url).with_max_connections(config.database_max_connections);

    let pool = PostgresPoolFactory::create_pool(&pool_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create PostgreSQL pool: {}", e))?;
    let store = PostgresRecordStore::new(pool);
    store
        .apply_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to apply schema: {}", e))?;
    Ok(store)
}

fn create_redis_cache(config: &AppConfig) -> anyhow::Result<RedisEphemeralCache> {
    let redis_config =
        RedisConfig::with_url(&config.redis_url).with_key_prefix(&config.cache_key_prefix);

    let connection = RedisConnectionFactory::create_client(&redis_config)
        .map_err(|e| anyhow::anyhow!("Failed to create Redis connection: {}", e))?;
    Ok(RedisEphemeralCache::new(connection))
}

/// A small campus for running without a database.
fn seed_campus() -> anyhow::Result<InMemoryRecordStore> {
    let store = InMemoryRecordStore::new();
    store.insert_user("Ada Admin", "ada@campus.test", UserType::Admin)?;
    store.insert_user("Grace Student", "grace@campus.test", UserType::Student)?;
    store.insert_user("Linus Student", "linus@campus.test", UserType::Student)?;

    let library = store.insert_building("Library")?;
    store.insert_location("Reading Room", library.identifier)?;
    let gym = store.insert_building("Gym")?;
    store.insert_location("Main Court", gym.identifier)?;

    store.insert_survey(
        "Orientation feedback",
        vec![
            (
                "How was the campus tour?".to_owned(),
                vec!["Great".to_owned(), "Fine".to_owned(), "Poor".to_owned()],
            ),
            (
                "Would you join a club?".to_owned(),
                vec!["Yes".to_owned(), "No".to_owned()],
            ),
        ],
    )?;

    tracing::info!("Seeded in-memory campus");
    Ok(store)
}
