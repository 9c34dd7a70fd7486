//! Join requests from guests to event hosts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{DomainError, EventIdentifier, RequestIdentifier, UserIdentifier};

// =============================================================================
// RequestStatus
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_text = match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        };
        write!(formatter, "{}", status_text)
    }
}

// =============================================================================
// NewRequest
// =============================================================================

/// A request about to be persisted. The host is recorded as it was when the
/// request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRequest {
    pub guest: UserIdentifier,
    pub host: UserIdentifier,
    pub event: EventIdentifier,
}

impl NewRequest {
    #[must_use]
    pub const fn new(guest: UserIdentifier, host: UserIdentifier, event: EventIdentifier) -> Self {
        Self { guest, host, event }
    }

    #[must_use]
    pub const fn into_request(self, identifier: RequestIdentifier) -> Request {
        Request {
            identifier,
            guest: self.guest,
            host: self.host,
            event: self.event,
            status: RequestStatus::Pending,
        }
    }
}

// =============================================================================
// Request
// =============================================================================

/// A guest's ask to join an event.
///
/// Leaves `Pending` exactly once. Rejecting an already rejected request is
/// accepted as a no-op; every other repeated or reversed decision fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    identifier: RequestIdentifier,
    guest: UserIdentifier,
    host: UserIdentifier,
    event: EventIdentifier,
    status: RequestStatus,
}

impl Request {
    #[must_use]
    pub const fn reconstruct(
        identifier: RequestIdentifier,
        guest: UserIdentifier,
        host: UserIdentifier,
        event: EventIdentifier,
        status: RequestStatus,
    ) -> Self {
        Self {
            identifier,
            guest,
            host,
            event,
            status,
        }
    }

    #[must_use]
    pub const fn identifier(&self) -> RequestIdentifier {
        self.identifier
    }

    #[must_use]
    pub const fn guest(&self) -> UserIdentifier {
        self.guest
    }

    #[must_use]
    pub const fn host(&self) -> UserIdentifier {
        self.host
    }

    #[must_use]
    pub const fn event(&self) -> EventIdentifier {
        self.event
    }

    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        self.status
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the request is pending.
    pub fn accept(&mut self) -> Result<(), DomainError> {
        if !self.status.is_pending() {
            return Err(DomainError::invalid_transition(
                "Request",
                self.status,
                RequestStatus::Accepted,
            ));
        }
        self.status = RequestStatus::Accepted;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the request was accepted.
    pub fn reject(&mut self) -> Result<(), DomainError> {
        if self.status == RequestStatus::Accepted {
            return Err(DomainError::invalid_transition(
                "Request",
                self.status,
                RequestStatus::Rejected,
            ));
        }
        self.status = RequestStatus::Rejected;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
