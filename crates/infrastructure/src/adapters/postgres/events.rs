use std::collections::HashMap;

use rendezvous_domain::common::{EventIdentifier, LocationIdentifier, UserIdentifier};
use rendezvous_domain::event::{Event, EventStatus, NewEvent};
use rendezvous_workflow::errors::WorkflowError;
use rendezvous_workflow::ports::{EventRepository, WorkflowResult};
use rendezvous_workflow::views::{ActiveEvent, EventDetails, RequestWithGuest};
use sqlx::Row;

use super::rows::{
    EVENT_COLUMNS, REQUEST_COLUMNS, SITED_EVENT_COLUMNS, SITED_EVENT_JOINS, decode_event,
    decode_request, decode_sited_event, decode_user, user_columns,
};
use super::store::{PostgresRecordStore, bind_identifiers, failure};
use crate::errors::InfraError;

fn to_column(value: u32, column: &str) -> Result<i32, InfraError> {
    i32::try_from(value)
        .map_err(|_| InfraError::integrity("Event", format!("{column} is too large: {value}")))
}

impl EventRepository for PostgresRecordStore {
    async fn find_event(&self, identifier: EventIdentifier) -> WorkflowResult<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1"))
            .bind(identifier.value())
            .fetch_optional(self.pool().as_inner())
            .await
            .map_err(failure("find_event"))?;

        row.map(|row| decode_event(&row))
            .transpose()
            .map_err(failure("find_event"))
    }

    async fn find_event_details(
        &self,
        identifier: EventIdentifier,
    ) -> WorkflowResult<Option<EventDetails>> {
        let row = sqlx::query(&format!(
            "SELECT {SITED_EVENT_COLUMNS}, {host} {SITED_EVENT_JOINS} \
             JOIN users h ON h.id = e.host_id WHERE e.id = $1",
            host = user_columns("h", "host")
        ))
        .bind(identifier.value())
        .fetch_optional(self.pool().as_inner())
        .await
        .map_err(failure("find_event_details"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let decode = || -> Result<EventDetails, InfraError> {
            let sited = decode_sited_event(&row)?;
            Ok(EventDetails {
                host: decode_user(&row, "host")?,
                event: sited.event,
                location: sited.location,
                building: sited.building,
            })
        };
        decode().map(Some).map_err(failure("find_event_details"))
    }

    async fn find_open_events(&self) -> WorkflowResult<Vec<ActiveEvent>> {
        let pool = self.pool().as_inner();

        // Step 1: open events with host and venue [IO]
        let event_rows = sqlx::query(&format!(
            "SELECT {SITED_EVENT_COLUMNS}, {host} {SITED_EVENT_JOINS} \
             JOIN users h ON h.id = e.host_id \
             WHERE e.event_status = 'open' ORDER BY e.id",
            host = user_columns("h", "host")
        ))
        .fetch_all(pool)
        .await
        .map_err(failure("find_open_events"))?;

        let mut events = event_rows
            .iter()
            .map(|row| {
                let sited = decode_sited_event(row)?;
                Ok(ActiveEvent {
                    host: decode_user(row, "host")?,
                    event: sited.event,
                    location: sited.location,
                    building: sited.building,
                    requests: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>, InfraError>>()
            .map_err(failure("find_open_events"))?;

        if events.is_empty() {
            return Ok(events);
        }

        // Step 2: their requests with guests, one query for all events [IO]
        let identifiers: Vec<EventIdentifier> =
            events.iter().map(|active| active.event.identifier()).collect();
        let request_rows = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS}, {guest} FROM requests r \
             JOIN users g ON g.id = r.guest_id \
             WHERE r.event_id = ANY($1) ORDER BY r.id",
            guest = user_columns("g", "guest")
        ))
        .bind(bind_identifiers(&identifiers))
        .fetch_all(pool)
        .await
        .map_err(failure("find_open_events"))?;

        // Step 3: attach requests to their events [Pure]
        let positions: HashMap<EventIdentifier, usize> = identifiers
            .iter()
            .enumerate()
            .map(|(position, identifier)| (*identifier, position))
            .collect();
        for row in &request_rows {
            let entry = RequestWithGuest {
                request: decode_request(row).map_err(failure("find_open_events"))?,
                guest: decode_user(row, "guest").map_err(failure("find_open_events"))?,
            };
            if let Some(position) = positions.get(&entry.request.event()) {
                events[*position].requests.push(entry);
            }
        }

        Ok(events)
    }

    async fn insert_event(&self, event: NewEvent) -> WorkflowResult<Event> {
        let pool = self.pool().as_inner();

        let references = sqlx::query(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1) AS host_exists, \
                    EXISTS (SELECT 1 FROM locations WHERE id = $2) AS location_exists",
        )
        .bind(event.host.value())
        .bind(event.location.value())
        .fetch_one(pool)
        .await
        .map_err(failure("insert_event"))?;
        let host_exists: bool = references
            .try_get("host_exists")
            .map_err(failure("insert_event"))?;
        let location_exists: bool = references
            .try_get("location_exists")
            .map_err(failure("insert_event"))?;
        if !host_exists {
            return Err(WorkflowError::not_found(UserIdentifier::ENTITY_TYPE, event.host));
        }
        if !location_exists {
            return Err(WorkflowError::not_found(
                LocationIdentifier::ENTITY_TYPE,
                event.location,
            ));
        }

        let max_guest_count =
            to_column(event.max_guest_count, "max_guest_count").map_err(failure("insert_event"))?;
        let guest_count =
            to_column(event.guest_count, "guest_count").map_err(failure("insert_event"))?;

        let identifier: i64 = sqlx::query_scalar(
            "INSERT INTO events \
                (title, description, start_time, end_time, max_guest_count, guest_count, \
                 event_status, host_id, location_id) \
             VALUES ($1, $2, $3, $4, $5, $6, 'open', $7, $8) RETURNING id",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(max_guest_count)
        .bind(guest_count)
        .bind(event.host.value())
        .bind(event.location.value())
        .fetch_one(pool)
        .await
        .map_err(failure("insert_event"))?;

        let identifier = EventIdentifier::new(identifier).map_err(failure("insert_event"))?;
        tracing::debug!(event_id = %identifier, "Event inserted");
        Ok(event.into_event(identifier))
    }

    async fn transition_status(
        &self,
        identifier: EventIdentifier,
        from: EventStatus,
        to: EventStatus,
    ) -> WorkflowResult<bool> {
        let result = sqlx::query(
            "UPDATE events SET event_status = $3 WHERE id = $1 AND event_status = $2",
        )
        .bind(identifier.value())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(self.pool().as_inner())
        .await
        .map_err(failure("transition_status"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn close_events(&self, identifiers: &[EventIdentifier]) -> WorkflowResult<u64> {
        if identifiers.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE events SET event_status = 'closed' \
             WHERE id = ANY($1) AND event_status = 'open'",
        )
        .bind(bind_identifiers(identifiers))
        .execute(self.pool().as_inner())
        .await
        .map_err(failure("close_events"))?;

        Ok(result.rows_affected())
    }
}
