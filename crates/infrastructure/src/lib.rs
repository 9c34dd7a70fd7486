//! Infrastructure layer for Rendezvous
//!
//! Concrete implementations of the workflow ports: the PostgreSQL record
//! store, the Redis ephemeral cache, in-memory counterparts of both, the
//! in-process survey topic registry and wall clocks.

pub mod adapters;
pub mod broadcast;
pub mod clock;
pub mod errors;

pub use broadcast::{Subscription, TopicRegistry};
pub use clock::{FixedClock, SystemClock};
