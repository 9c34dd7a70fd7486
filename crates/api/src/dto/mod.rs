//! Request and response bodies.
//!
//! Read models from the workflow layer are serialized as they are; only
//! inputs and small acknowledgements have their own types here.

pub mod request;
pub mod response;
