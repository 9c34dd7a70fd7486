use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventStatus;
use crate::common::{DomainError, EventIdentifier, LocationIdentifier, UserIdentifier};

// =============================================================================
// NewEvent
// =============================================================================

/// A validated event that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_guest_count: u32,
    pub guest_count: u32,
    pub host: UserIdentifier,
    pub location: LocationIdentifier,
}

impl NewEvent {
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the title is blank, the end
    /// precedes the start, or the initial guest count exceeds the maximum.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        max_guest_count: u32,
        guest_count: u32,
        host: UserIdentifier,
        location: LocationIdentifier,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if end_time < start_time {
            return Err(DomainError::validation(
                "end_time",
                "must not be earlier than start_time",
            ));
        }
        validate_guest_count(guest_count, max_guest_count)?;

        Ok(Self {
            title,
            description: description.into(),
            start_time,
            end_time,
            max_guest_count,
            guest_count,
            host,
            location,
        })
    }

    #[must_use]
    pub fn into_event(self, identifier: EventIdentifier) -> Event {
        Event {
            identifier,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
            max_guest_count: self.max_guest_count,
            guest_count: self.guest_count,
            status: EventStatus::Open,
            host: self.host,
            location: self.location,
        }
    }
}

// =============================================================================
// Event
// =============================================================================

/// A capacity-bounded gathering hosted by one user at one location.
///
/// `guest_count <= max_guest_count` holds for every value of this type;
/// the only way to raise the count is [`Event::admit_guest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    identifier: EventIdentifier,
    title: String,
    description: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_guest_count: u32,
    guest_count: u32,
    status: EventStatus,
    host: UserIdentifier,
    location: LocationIdentifier,
}

impl Event {
    /// Rebuilds an event from stored values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the stored guest count is above
    /// the maximum.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        identifier: EventIdentifier,
        title: String,
        description: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        max_guest_count: u32,
        guest_count: u32,
        status: EventStatus,
        host: UserIdentifier,
        location: LocationIdentifier,
    ) -> Result<Self, DomainError> {
        validate_guest_count(guest_count, max_guest_count)?;
        Ok(Self {
            identifier,
            title,
            description,
            start_time,
            end_time,
            max_guest_count,
            guest_count,
            status,
            host,
            location,
        })
    }

    #[must_use]
    pub const fn identifier(&self) -> EventIdentifier {
        self.identifier
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    #[must_use]
    pub const fn max_guest_count(&self) -> u32 {
        self.max_guest_count
    }

    #[must_use]
    pub const fn guest_count(&self) -> u32 {
        self.guest_count
    }

    #[must_use]
    pub const fn status(&self) -> EventStatus {
        self.status
    }

    #[must_use]
    pub const fn host(&self) -> UserIdentifier {
        self.host
    }

    #[must_use]
    pub const fn location(&self) -> LocationIdentifier {
        self.location
    }
}

// =============================================================================
// Capacity
// =============================================================================

impl Event {
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.max_guest_count.saturating_sub(self.guest_count)
    }

    /// Whether one more guest fits, i.e. `guest_count + 1 <= max_guest_count`.
    #[must_use]
    pub const fn has_room_for_guest(&self) -> bool {
        self.guest_count < self.max_guest_count
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.guest_count >= self.max_guest_count
    }

    /// # Errors
    ///
    /// Returns `DomainError::CapacityExceeded` when the event is already full.
    pub fn admit_guest(&mut self) -> Result<(), DomainError> {
        if !self.has_room_for_guest() {
            return Err(DomainError::capacity_exceeded(
                self.guest_count,
                self.max_guest_count,
            ));
        }
        self.guest_count += 1;
        Ok(())
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

impl Event {
    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    /// Whether a sweep at `now` should close this event.
    #[must_use]
    pub fn should_close(&self, now: DateTime<Utc>) -> bool {
        self.is_full() || self.has_ended(now)
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the event is open.
    pub fn close(&mut self) -> Result<(), DomainError> {
        self.transition_to(EventStatus::Closed)
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the event is open.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(EventStatus::Cancelled)
    }

    fn transition_to(&mut self, next: EventStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid_transition("Event", self.status, next));
        }
        self.status = next;
        Ok(())
    }
}

fn validate_guest_count(guest_count: u32, max_guest_count: u32) -> Result<(), DomainError> {
    if guest_count > max_guest_count {
        return Err(DomainError::validation(
            "guest_count",
            format!("{guest_count} exceeds max_guest_count {max_guest_count}"),
        ));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
