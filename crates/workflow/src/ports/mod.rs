use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rendezvous_domain::common::{
    BuildingIdentifier, EventIdentifier, LocationIdentifier, RequestIdentifier, SurveyIdentifier,
    SurveyQuestionIdentifier, UserIdentifier,
};
use rendezvous_domain::event::{Event, EventStatus, NewEvent};
use rendezvous_domain::request::{NewRequest, Request};
use rendezvous_domain::survey::{NewSurveyAnswer, Survey, SurveyAnswer, SurveyTopic};
use rendezvous_domain::user::User;
use rendezvous_domain::venue::{Building, Location};

use crate::views::{
    ActiveEvent, BuildingDetails, EventDetails, EventRequest, GuestRequest, HostRequest,
    RequestContext, UserProfile,
};

// =============================================================================
// Type Aliases for Workflow Results
// =============================================================================

pub type WorkflowResult<T> = Result<T, crate::errors::WorkflowError>;

// =============================================================================
// UserRepository
// =============================================================================

pub trait UserRepository: Clone + Send + Sync + 'static {
    fn find_user(
        &self,
        identifier: UserIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<User>>> + Send;

    /// User with hosted events and joined events, each expanded with
    /// location and building (joined events also with their host).
    fn find_profile(
        &self,
        identifier: UserIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<UserProfile>>> + Send;
}

// =============================================================================
// VenueRepository
// =============================================================================

pub trait VenueRepository: Clone + Send + Sync + 'static {
    fn find_location(
        &self,
        identifier: LocationIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<Location>>> + Send;

    fn find_building(
        &self,
        identifier: BuildingIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<BuildingDetails>>> + Send;

    fn list_buildings(&self) -> impl Future<Output = WorkflowResult<Vec<Building>>> + Send;
}

// =============================================================================
// EventRepository
// =============================================================================

pub trait EventRepository: Clone + Send + Sync + 'static {
    fn find_event(
        &self,
        identifier: EventIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<Event>>> + Send;

    fn find_event_details(
        &self,
        identifier: EventIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<EventDetails>>> + Send;

    /// Open events expanded with host, location, building and requests with
    /// guests, in ascending identifier order.
    fn find_open_events(&self) -> impl Future<Output = WorkflowResult<Vec<ActiveEvent>>> + Send;

    fn insert_event(&self, event: NewEvent) -> impl Future<Output = WorkflowResult<Event>> + Send;

    /// Conditional status write: moves the event from `from` to `to` only if
    /// its stored status is still `from`. Returns whether a row changed.
    fn transition_status(
        &self,
        identifier: EventIdentifier,
        from: EventStatus,
        to: EventStatus,
    ) -> impl Future<Output = WorkflowResult<bool>> + Send;

    /// Batched conditional update: sets every listed event that is still
    /// open to closed in one operation. Returns the number of rows changed.
    fn close_events(
        &self,
        identifiers: &[EventIdentifier],
    ) -> impl Future<Output = WorkflowResult<u64>> + Send;
}

// =============================================================================
// RequestRepository
// =============================================================================

/// Result of the atomic acceptance step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceOutcome {
    /// The seat was taken, the request accepted and the guest linked.
    Accepted,
    /// No seat was left when the guarded increment ran; the request is now
    /// rejected.
    CapacityReached,
    /// The request had already been decided by someone else.
    NoLongerPending,
}

pub trait RequestRepository: Clone + Send + Sync + 'static {
    fn find_request(
        &self,
        identifier: RequestIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<Request>>> + Send;

    /// Request with its event and guest.
    fn find_request_context(
        &self,
        identifier: RequestIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<RequestContext>>> + Send;

    fn insert_request(
        &self,
        request: NewRequest,
    ) -> impl Future<Output = WorkflowResult<Request>> + Send;

    /// Stores the request's status if the stored request is still pending
    /// or already has that status; any other stored decision is a conflict.
    fn save_request(&self, request: &Request) -> impl Future<Output = WorkflowResult<()>> + Send;

    /// Takes one seat of the request's event and accepts the request as a
    /// single atomic unit.
    ///
    /// The seat is taken with a conditional write that only succeeds while
    /// `guest_count < max_guest_count`, whatever the event status, so two callers
    /// racing for the last seat cannot both succeed. On success the request
    /// is marked accepted and the event is linked to the guest's joined
    /// events; if no seat is left the request is marked rejected instead.
    fn accept_request(
        &self,
        request: &Request,
    ) -> impl Future<Output = WorkflowResult<AcceptanceOutcome>> + Send;

    /// Pending requests addressed to `host`.
    fn find_host_requests(
        &self,
        host: UserIdentifier,
    ) -> impl Future<Output = WorkflowResult<Vec<HostRequest>>> + Send;

    fn find_guest_requests(
        &self,
        guest: UserIdentifier,
    ) -> impl Future<Output = WorkflowResult<Vec<GuestRequest>>> + Send;

    fn find_event_requests(
        &self,
        event: EventIdentifier,
    ) -> impl Future<Output = WorkflowResult<Vec<EventRequest>>> + Send;
}

// =============================================================================
// SurveyRepository
// =============================================================================

pub trait SurveyRepository: Clone + Send + Sync + 'static {
    /// Survey with all questions and their answers.
    fn find_survey(
        &self,
        identifier: SurveyIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<Survey>>> + Send;

    fn list_surveys(&self) -> impl Future<Output = WorkflowResult<Vec<Survey>>> + Send;

    /// The fully loaded survey that owns `question`.
    fn find_survey_by_question(
        &self,
        question: SurveyQuestionIdentifier,
    ) -> impl Future<Output = WorkflowResult<Option<Survey>>> + Send;

    fn insert_answer(
        &self,
        answer: NewSurveyAnswer,
    ) -> impl Future<Output = WorkflowResult<SurveyAnswer>> + Send;

    /// Persists the survey's current question index.
    fn save_progress(&self, survey: &Survey) -> impl Future<Output = WorkflowResult<()>> + Send;
}

// =============================================================================
// EphemeralCache
// =============================================================================

pub trait EphemeralCache: Clone + Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = WorkflowResult<Option<String>>> + Send;

    fn set(
        &self,
        key: &str,
        value: String,
        time_to_live: Duration,
    ) -> impl Future<Output = WorkflowResult<()>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = WorkflowResult<()>> + Send;
}

// =============================================================================
// SurveyPublisher
// =============================================================================

/// Fire-and-forget delivery of survey state to the listeners of a topic.
pub trait SurveyPublisher: Clone + Send + Sync + 'static {
    /// Returns how many listeners received the update.
    fn publish(&self, topic: &SurveyTopic, survey: &Survey) -> usize;
}

// =============================================================================
// Clock
// =============================================================================

pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}
