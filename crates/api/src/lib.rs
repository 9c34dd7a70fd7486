//! HTTP layer for Rendezvous
//!
//! Exposes the workflows over an axum router, runs the periodic lifecycle
//! sweep and streams live survey updates as server-sent events.

pub mod config;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
