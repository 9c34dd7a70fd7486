use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use rendezvous_domain::common::UserIdentifier;
use rendezvous_domain::survey::Survey;
use rendezvous_domain::user::User;
use rendezvous_domain::venue::Building;
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use rendezvous_workflow::views::{
    BuildingDetails, EventDetails, EventRequest, GuestRequest, HostRequest, UserProfile,
};
use rendezvous_workflow::workflows::directory;

use super::identifier;
use crate::errors::ApiError;
use crate::state::{AppState, RecordStore};

/// Header carrying the caller's user id, set by the trusted gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

fn caller(headers: &HeaderMap) -> Result<Option<UserIdentifier>, ApiError> {
    let Some(value) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .map_err(|_| ApiError::validation("X-User-Id must be visible ASCII"))?
        .parse::<UserIdentifier>()
        .map(Some)
        .map_err(|error| ApiError::validation(format!("X-User-Id: {error}")))
}

// =============================================================================
// Users
// =============================================================================

pub async fn current_user<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    headers: HeaderMap,
) -> Result<Json<Option<User>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let user = directory::current_user(state.store(), caller(&headers)?).await?;
    Ok(Json(user))
}

pub async fn user_profile<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Option<UserProfile>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let profile = directory::user_profile(state.store(), identifier("user_id", user_id)?).await?;
    Ok(Json(profile))
}

pub async fn user_host_requests<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<HostRequest>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let requests =
        directory::user_host_requests(state.store(), identifier("user_id", user_id)?).await?;
    Ok(Json(requests))
}

pub async fn user_guest_requests<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<GuestRequest>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let requests =
        directory::user_guest_requests(state.store(), identifier("user_id", user_id)?).await?;
    Ok(Json(requests))
}

// =============================================================================
// Surveys
// =============================================================================

pub async fn surveys<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
) -> Result<Json<Vec<Survey>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    Ok(Json(directory::surveys(state.store()).await?))
}

pub async fn survey<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(survey_id): Path<i64>,
) -> Result<Json<Option<Survey>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let survey = directory::survey(state.store(), identifier("survey_id", survey_id)?).await?;
    Ok(Json(survey))
}

// =============================================================================
// Venues
// =============================================================================

pub async fn buildings<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
) -> Result<Json<Vec<Building>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    Ok(Json(directory::buildings(state.store()).await?))
}

pub async fn building<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(building_id): Path<i64>,
) -> Result<Json<Option<BuildingDetails>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let building =
        directory::building(state.store(), identifier("building_id", building_id)?).await?;
    Ok(Json(building))
}

// =============================================================================
// Events
// =============================================================================

pub async fn event_details<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(event_id): Path<i64>,
) -> Result<Json<Option<EventDetails>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let details = directory::event_details(state.store(), identifier("event_id", event_id)?).await?;
    Ok(Json(details))
}

pub async fn event_requests<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<EventRequest>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let requests =
        directory::event_requests(state.store(), identifier("event_id", event_id)?).await?;
    Ok(Json(requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    fn missing_header_is_anonymous() {
        assert_eq!(caller(&HeaderMap::new()).unwrap(), None);
    }

    #[rstest]
    #[case("7", Some(7))]
    #[case(" 12 ", Some(12))]
    fn numeric_header_identifies_caller(#[case] raw: &str, #[case] expected: Option<i64>) {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(raw).unwrap());

        let caller = caller(&headers).unwrap().map(UserIdentifier::value);

        assert_eq!(caller, expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("0")]
    fn malformed_header_is_rejected(#[case] raw: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(raw).unwrap());

        assert!(caller(&headers).is_err());
    }
}
