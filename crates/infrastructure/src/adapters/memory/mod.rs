//! Process-local adapters used for development and tests.

mod cache;
mod store;

pub use cache::InMemoryEphemeralCache;
pub use store::InMemoryRecordStore;
