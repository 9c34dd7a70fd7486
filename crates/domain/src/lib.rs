//! Domain layer for Rendezvous
//!
//! This crate contains the entities and value objects of the campus event
//! service together with their state transitions. Everything here is pure:
//! persistence, caching and broadcasting live in the outer layers.

pub mod common;
pub mod event;
pub mod request;
pub mod survey;
pub mod user;
pub mod venue;
