mod aggregate;
mod status;

pub use aggregate::{Event, NewEvent};
pub use status::EventStatus;
