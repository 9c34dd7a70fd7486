//! Relation-expanded read models returned by the record store.
//!
//! Each view mirrors one "find with relations" query. They are serializable
//! because the active-event listing is memoized as JSON in the cache and the
//! HTTP layer returns them as-is.

use rendezvous_domain::event::Event;
use rendezvous_domain::request::Request;
use rendezvous_domain::user::User;
use rendezvous_domain::venue::{Building, Location};
use serde::{Deserialize, Serialize};

// =============================================================================
// Venue Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingDetails {
    pub building: Building,
    pub locations: Vec<Location>,
}

/// An event with its location and the location's building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitedEvent {
    pub event: Event,
    pub location: Location,
    pub building: Building,
}

// =============================================================================
// Event Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestWithGuest {
    pub request: Request,
    pub guest: User,
}

/// One entry of the active-event listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: Event,
    pub host: User,
    pub location: Location,
    pub building: Building,
    pub requests: Vec<RequestWithGuest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub event: Event,
    pub host: User,
    pub location: Location,
    pub building: Building,
}

// =============================================================================
// Request Views
// =============================================================================

/// A request together with everything needed to decide on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub request: Request,
    pub event: Event,
    pub guest: User,
}

/// A pending request seen from the host's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRequest {
    pub request: Request,
    pub event: SitedEvent,
    pub guest: User,
}

/// A request seen from the guest's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestRequest {
    pub request: Request,
    pub event: SitedEvent,
    pub host: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRequest {
    pub request: Request,
    pub host: User,
    pub guest: User,
}

// =============================================================================
// User Views
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedEvent {
    pub event: SitedEvent,
    pub host: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub host_events: Vec<SitedEvent>,
    pub guest_events: Vec<JoinedEvent>,
}
