//! Workflow layer for Rendezvous
//!
//! This crate defines the application use cases: request acceptance under
//! capacity limits, the cached active-event listing, the lifecycle sweep and
//! live survey broadcasting. It declares the ports (traits) it needs from the
//! outside world without implementing any I/O itself.

pub mod errors;
pub mod ports;
pub mod views;
pub mod workflows;

#[cfg(test)]
mod testing;
