//! Read-only lookups. Absent single records are `Ok(None)`, never errors.

use rendezvous_domain::common::{
    BuildingIdentifier, EventIdentifier, SurveyIdentifier, UserIdentifier,
};
use rendezvous_domain::survey::Survey;
use rendezvous_domain::user::User;
use rendezvous_domain::venue::Building;

use crate::ports::{
    EventRepository, RequestRepository, SurveyRepository, UserRepository, VenueRepository,
    WorkflowResult,
};
use crate::views::{
    BuildingDetails, EventDetails, EventRequest, GuestRequest, HostRequest, UserProfile,
};

/// The caller identified by the transport, if any.
///
/// # Errors
///
/// Propagates record store failures.
pub async fn current_user<Users: UserRepository>(
    users: &Users,
    caller: Option<UserIdentifier>,
) -> WorkflowResult<Option<User>> {
    match caller {
        Some(identifier) => users.find_user(identifier).await,
        None => Ok(None),
    }
}

/// # Errors
///
/// Propagates record store failures.
pub async fn survey<Surveys: SurveyRepository>(
    surveys: &Surveys,
    identifier: SurveyIdentifier,
) -> WorkflowResult<Option<Survey>> {
    surveys.find_survey(identifier).await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn surveys<Surveys: SurveyRepository>(surveys: &Surveys) -> WorkflowResult<Vec<Survey>> {
    surveys.list_surveys().await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn building<Venues: VenueRepository>(
    venues: &Venues,
    identifier: BuildingIdentifier,
) -> WorkflowResult<Option<BuildingDetails>> {
    venues.find_building(identifier).await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn buildings<Venues: VenueRepository>(venues: &Venues) -> WorkflowResult<Vec<Building>> {
    venues.list_buildings().await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn user_profile<Users: UserRepository>(
    users: &Users,
    identifier: UserIdentifier,
) -> WorkflowResult<Option<UserProfile>> {
    users.find_profile(identifier).await
}

/// Pending requests waiting on `host`.
///
/// # Errors
///
/// Propagates record store failures.
pub async fn user_host_requests<Requests: RequestRepository>(
    requests: &Requests,
    host: UserIdentifier,
) -> WorkflowResult<Vec<HostRequest>> {
    requests.find_host_requests(host).await
}

/// Every request `guest` has made, whatever its status.
///
/// # Errors
///
/// Propagates record store failures.
pub async fn user_guest_requests<Requests: RequestRepository>(
    requests: &Requests,
    guest: UserIdentifier,
) -> WorkflowResult<Vec<GuestRequest>> {
    requests.find_guest_requests(guest).await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn event_requests<Requests: RequestRepository>(
    requests: &Requests,
    event: EventIdentifier,
) -> WorkflowResult<Vec<EventRequest>> {
    requests.find_event_requests(event).await
}

/// # Errors
///
/// Propagates record store failures.
pub async fn event_details<Events: EventRepository>(
    events: &Events,
    identifier: EventIdentifier,
) -> WorkflowResult<Option<EventDetails>> {
    events.find_event_details(identifier).await
}
