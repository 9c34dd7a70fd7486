//! PostgreSQL adapters: pool construction and the record store.

mod config;
mod events;
mod factory;
mod pool;
mod requests;
mod rows;
mod store;
mod surveys;
mod users;
mod venues;

pub use config::PostgresPoolConfig;
pub use factory::PostgresPoolFactory;
pub use pool::PostgresPool;
pub use store::PostgresRecordStore;
