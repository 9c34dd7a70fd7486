//! Use cases, one module per controller.

pub mod active_events;
pub mod capacity;
pub mod directory;
pub mod event_management;
pub mod survey;
pub mod sweeper;

pub use active_events::{
    ACTIVE_EVENTS_KEY, ACTIVE_EVENTS_PAGES_KEY, ActiveEventPages, ActiveEventsPaginator,
    ListingSettings,
};
pub use capacity::{CreateRequestCommand, accept_request, create_request, reject_request};
pub use event_management::{CreateEventCommand, cancel_event, create_event};
pub use survey::{answer_survey, next_survey_question};
pub use sweeper::{SweepReport, auto_update_events};
