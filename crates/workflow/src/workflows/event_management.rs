//! Event creation and cancellation.

use chrono::{DateTime, Utc};
use rendezvous_domain::common::{EventIdentifier, LocationIdentifier, UserIdentifier};
use rendezvous_domain::event::{Event, EventStatus, NewEvent};

use crate::errors::WorkflowError;
use crate::ports::{EventRepository, UserRepository, VenueRepository, WorkflowResult};

// =============================================================================
// Create Event
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventCommand {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_guest_count: u32,
    pub guest_count: u32,
    pub host: UserIdentifier,
    pub location: LocationIdentifier,
}

/// # Errors
///
/// - `WorkflowError::Validation` for a blank title, an end before the start
///   or an initial guest count above the maximum
/// - `WorkflowError::NotFound` if the host or location is missing
pub async fn create_event<Users, Venues, Events>(
    users: &Users,
    venues: &Venues,
    events: &Events,
    command: CreateEventCommand,
) -> WorkflowResult<Event>
where
    Users: UserRepository,
    Venues: VenueRepository,
    Events: EventRepository,
{
    // Step 1: Validate [Pure]
    let new_event = NewEvent::new(
        command.title,
        command.description,
        command.start_time,
        command.end_time,
        command.max_guest_count,
        command.guest_count,
        command.host,
        command.location,
    )?;

    // Step 2: Resolve references [IO]
    if users.find_user(command.host).await?.is_none() {
        return Err(WorkflowError::not_found(
            UserIdentifier::ENTITY_TYPE,
            command.host,
        ));
    }
    if venues.find_location(command.location).await?.is_none() {
        return Err(WorkflowError::not_found(
            LocationIdentifier::ENTITY_TYPE,
            command.location,
        ));
    }

    // Step 3: Persist [IO]
    let event = events.insert_event(new_event).await?;

    tracing::info!(
        event = %event.identifier(),
        host = %event.host(),
        max_guest_count = event.max_guest_count(),
        "Event created"
    );
    Ok(event)
}

// =============================================================================
// Cancel Event
// =============================================================================

/// Moves an open event to cancelled. The active-event listing is left to
/// expire on its own.
///
/// # Errors
///
/// - `WorkflowError::NotFound` if the event does not exist
/// - `WorkflowError::Conflict` if the event is not open
pub async fn cancel_event<Events>(
    events: &Events,
    identifier: EventIdentifier,
) -> WorkflowResult<bool>
where
    Events: EventRepository,
{
    let mut event = events
        .find_event(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(EventIdentifier::ENTITY_TYPE, identifier))?;

    let previous = event.status();
    event.cancel()?;

    if !events
        .transition_status(identifier, previous, EventStatus::Cancelled)
        .await?
    {
        return Err(WorkflowError::conflict(format!(
            "event {identifier} changed status concurrently"
        )));
    }

    tracing::info!(event = %identifier, "Event cancelled");
    Ok(true)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, fixed_now, identifier};
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn command() -> CreateEventCommand {
        CreateEventCommand {
            title: "Board games".to_owned(),
            description: "Bring your own".to_owned(),
            start_time: fixed_now(),
            end_time: fixed_now() + Duration::hours(2),
            max_guest_count: 8,
            guest_count: 0,
            host: identifier(1),
            location: identifier(1),
        }
    }

    mod create {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn persists_open_event(command: CreateEventCommand) {
            let store = FakeStore::seeded();

            let event = create_event(&store, &store, &store, command).await.unwrap();

            assert_eq!(event.status(), EventStatus::Open);
            assert_eq!(store.event(event.identifier()), event);
        }

        #[rstest]
        #[tokio::test]
        async fn guest_count_above_maximum_is_invalid(mut command: CreateEventCommand) {
            let store = FakeStore::seeded();
            command.guest_count = 9;

            let error = create_event(&store, &store, &store, command).await.unwrap_err();

            assert!(error.is_validation());
        }

        #[rstest]
        #[tokio::test]
        async fn end_before_start_is_invalid(mut command: CreateEventCommand) {
            let store = FakeStore::seeded();
            command.end_time = command.start_time - Duration::minutes(1);

            let error = create_event(&store, &store, &store, command).await.unwrap_err();

            assert!(error.is_validation());
        }

        #[rstest]
        #[case::unknown_host(99, 1)]
        #[case::unknown_location(1, 99)]
        #[tokio::test]
        async fn missing_reference_is_not_found(
            mut command: CreateEventCommand,
            #[case] host: i64,
            #[case] location: i64,
        ) {
            let store = FakeStore::seeded();
            command.host = identifier(host);
            command.location = identifier(location);

            let error = create_event(&store, &store, &store, command).await.unwrap_err();

            assert!(error.is_not_found());
        }
    }

    mod cancel {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn open_event_becomes_cancelled() {
            let store = FakeStore::seeded();
            let event = store.add_event(1, 0, 5);

            assert!(cancel_event(&store, event).await.unwrap());
            assert_eq!(store.event(event).status(), EventStatus::Cancelled);
        }

        #[rstest]
        #[case(EventStatus::Closed)]
        #[case(EventStatus::Cancelled)]
        #[tokio::test]
        async fn terminal_event_is_a_conflict(#[case] status: EventStatus) {
            let store = FakeStore::seeded();
            let event = store.add_event(1, 0, 5);
            store.set_status(event, status);

            let error = cancel_event(&store, event).await.unwrap_err();

            assert!(error.is_conflict());
            assert_eq!(store.event(event).status(), status);
            assert_eq!(store.transition_calls(), 0);
        }

        #[rstest]
        #[tokio::test]
        async fn missing_event_is_not_found() {
            let store = FakeStore::seeded();
            assert!(cancel_event(&store, identifier(7)).await.unwrap_err().is_not_found());
        }
    }
}
