//! Axum handlers, one module per resource.
//!
//! Handlers are generic over the state's store, cache and clock so the same
//! router runs on PostgreSQL/Redis in production and on the in-memory
//! adapters in tests.

mod directory;
mod events;
mod health;
mod requests;
mod surveys;

pub use directory::{
    building, buildings, current_user, event_details, event_requests, survey, surveys,
    user_guest_requests, user_host_requests, user_profile,
};
pub use events::{
    active_events, active_events_page, active_events_page_count, cancel_event, create_event,
    sweep_events,
};
pub use health::health_check;
pub use requests::{accept_request, create_request, reject_request};
pub use surveys::{answer_survey, next_survey_question, survey_updates};

use rendezvous_domain::common::DomainError;

use crate::errors::ApiError;

/// Converts a raw path or body value into a typed identifier.
fn identifier<T>(field: &str, value: i64) -> Result<T, ApiError>
where
    T: TryFrom<i64, Error = DomainError>,
{
    T::try_from(value).map_err(|error| ApiError::validation(format!("{field}: {error}")))
}
