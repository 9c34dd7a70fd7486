//! Row decoding shared by the PostgreSQL repositories.
//!
//! Queries alias their columns with a role prefix (`host_name`,
//! `guest_email`, ...) so one row can carry several users.

use chrono::{DateTime, Utc};
use rendezvous_domain::common::{
    BuildingIdentifier, EventIdentifier, LocationIdentifier, RequestIdentifier, UserIdentifier,
};
use rendezvous_domain::event::{Event, EventStatus};
use rendezvous_domain::request::{Request, RequestStatus};
use rendezvous_domain::user::{User, UserType};
use rendezvous_domain::venue::{Building, Location};
use rendezvous_workflow::views::SitedEvent;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::errors::InfraError;

// =============================================================================
// Column Lists
// =============================================================================

/// Bare event columns, read by [`decode_event`].
pub(super) const EVENT_COLUMNS: &str = "\
    e.id AS event_id, e.title, e.description, e.start_time, e.end_time, \
    e.max_guest_count, e.guest_count, e.event_status, e.host_id AS event_host_id, e.location_id";

/// Event, location and building columns; pair with [`SITED_EVENT_JOINS`].
pub(super) const SITED_EVENT_COLUMNS: &str = "\
    e.id AS event_id, e.title, e.description, e.start_time, e.end_time, \
    e.max_guest_count, e.guest_count, e.event_status, e.host_id AS event_host_id, \
    e.location_id, l.name AS location_name, l.building_id, b.name AS building_name";

pub(super) const SITED_EVENT_JOINS: &str = "\
    FROM events e \
    JOIN locations l ON l.id = e.location_id \
    JOIN buildings b ON b.id = l.building_id";

pub(super) const REQUEST_COLUMNS: &str = "\
    r.id AS request_id, r.guest_id AS request_guest_id, r.host_id AS request_host_id, \
    r.event_id AS request_event_id, r.request_status";

/// Columns of the `users` row aliased as `alias`, renamed with `alias` as
/// prefix, e.g. `h.name AS host_name`.
pub(super) fn user_columns(alias: &str, prefix: &str) -> String {
    format!(
        "{alias}.id AS {prefix}_id, {alias}.name AS {prefix}_name, \
         {alias}.email AS {prefix}_email, {alias}.user_type AS {prefix}_user_type"
    )
}

// =============================================================================
// Decoders
// =============================================================================

fn count(row: &PgRow, column: &str) -> Result<u32, InfraError> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value)
        .map_err(|_| InfraError::integrity("Event", format!("{column} is negative: {value}")))
}

pub(super) fn decode_user(row: &PgRow, prefix: &str) -> Result<User, InfraError> {
    let user_type: String = row.try_get(format!("{prefix}_user_type").as_str())?;
    let user_type = UserType::parse(&user_type)
        .ok_or_else(|| InfraError::integrity("User", format!("unknown user type '{user_type}'")))?;

    Ok(User::new(
        UserIdentifier::new(row.try_get(format!("{prefix}_id").as_str())?)?,
        row.try_get::<String, _>(format!("{prefix}_name").as_str())?,
        row.try_get::<String, _>(format!("{prefix}_email").as_str())?,
        user_type,
    ))
}

pub(super) fn decode_building(row: &PgRow) -> Result<Building, InfraError> {
    Ok(Building::new(
        BuildingIdentifier::new(row.try_get("building_id")?)?,
        row.try_get::<String, _>("building_name")?,
    ))
}

pub(super) fn decode_location(row: &PgRow) -> Result<Location, InfraError> {
    Ok(Location::new(
        LocationIdentifier::new(row.try_get("location_id")?)?,
        row.try_get::<String, _>("location_name")?,
        BuildingIdentifier::new(row.try_get("building_id")?)?,
    ))
}

pub(super) fn decode_event(row: &PgRow) -> Result<Event, InfraError> {
    let status: String = row.try_get("event_status")?;
    let status = EventStatus::parse(&status)
        .ok_or_else(|| InfraError::integrity("Event", format!("unknown status '{status}'")))?;

    Ok(Event::reconstruct(
        EventIdentifier::new(row.try_get("event_id")?)?,
        row.try_get("title")?,
        row.try_get("description")?,
        row.try_get::<DateTime<Utc>, _>("start_time")?,
        row.try_get::<DateTime<Utc>, _>("end_time")?,
        count(row, "max_guest_count")?,
        count(row, "guest_count")?,
        status,
        UserIdentifier::new(row.try_get("event_host_id")?)?,
        LocationIdentifier::new(row.try_get("location_id")?)?,
    )?)
}

pub(super) fn decode_sited_event(row: &PgRow) -> Result<SitedEvent, InfraError> {
    Ok(SitedEvent {
        event: decode_event(row)?,
        location: decode_location(row)?,
        building: decode_building(row)?,
    })
}

pub(super) fn decode_request(row: &PgRow) -> Result<Request, InfraError> {
    let status: String = row.try_get("request_status")?;
    let status = RequestStatus::parse(&status)
        .ok_or_else(|| InfraError::integrity("Request", format!("unknown status '{status}'")))?;

    Ok(Request::reconstruct(
        RequestIdentifier::new(row.try_get("request_id")?)?,
        UserIdentifier::new(row.try_get("request_guest_id")?)?,
        UserIdentifier::new(row.try_get("request_host_id")?)?,
        EventIdentifier::new(row.try_get("request_event_id")?)?,
        status,
    ))
}
