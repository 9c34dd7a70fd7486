//! Guest request decisions under event capacity.

use rendezvous_domain::common::{EventIdentifier, RequestIdentifier, UserIdentifier};
use rendezvous_domain::event::Event;
use rendezvous_domain::request::{NewRequest, Request};
use rendezvous_domain::user::User;

use crate::errors::WorkflowError;
use crate::ports::{
    AcceptanceOutcome, EventRepository, RequestRepository, UserRepository, WorkflowResult,
};
use crate::views::RequestContext;

// =============================================================================
// Accept Request
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    /// The loaded event is already full; store the rejection.
    Refuse(Request),
    /// A seat looked free; let the store take it atomically.
    TakeSeat(Request),
}

// -----------------------------------------------------------------------------
// Step 1: Decide [Pure]
// -----------------------------------------------------------------------------

fn decide(context: &RequestContext) -> WorkflowResult<Decision> {
    let mut request = context.request;

    if !request.status().is_pending() {
        return Err(WorkflowError::conflict(format!(
            "request {} is already {}",
            request.identifier(),
            request.status()
        )));
    }

    if context.event.has_room_for_guest() {
        return Ok(Decision::TakeSeat(request));
    }

    request.reject()?;
    Ok(Decision::Refuse(request))
}

// -----------------------------------------------------------------------------
// Step 2: Apply [IO]
// -----------------------------------------------------------------------------

/// Accepts a pending request if its event still has a free seat.
///
/// Returns `Ok(false)` when the event is full; the request is then stored as
/// rejected. Capacity is enforced by the store's guarded write, so at most
/// one of several concurrent acceptances can take the last seat.
///
/// # Errors
///
/// - `WorkflowError::NotFound` if the request does not exist
/// - `WorkflowError::Conflict` if the request is no longer pending
pub async fn accept_request<Requests>(
    requests: &Requests,
    identifier: RequestIdentifier,
) -> WorkflowResult<bool>
where
    Requests: RequestRepository,
{
    let context = requests
        .find_request_context(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(RequestIdentifier::ENTITY_TYPE, identifier))?;

    match decide(&context)? {
        Decision::Refuse(request) => {
            requests.save_request(&request).await?;
            tracing::info!(
                request = %identifier,
                event = %context.event.identifier(),
                guest_count = context.event.guest_count(),
                max_guest_count = context.event.max_guest_count(),
                "Request rejected, event is full"
            );
            Ok(false)
        }
        Decision::TakeSeat(request) => match requests.accept_request(&request).await? {
            AcceptanceOutcome::Accepted => {
                tracing::info!(
                    request = %identifier,
                    event = %context.event.identifier(),
                    guest = %context.guest.identifier,
                    "Request accepted"
                );
                Ok(true)
            }
            AcceptanceOutcome::CapacityReached => {
                tracing::info!(
                    request = %identifier,
                    event = %context.event.identifier(),
                    "Request rejected, event filled up before the seat was taken"
                );
                Ok(false)
            }
            AcceptanceOutcome::NoLongerPending => Err(WorkflowError::conflict(format!(
                "request {identifier} was decided concurrently"
            ))),
        },
    }
}

// =============================================================================
// Reject Request
// =============================================================================

/// Marks a request as rejected. Rejecting twice is harmless.
///
/// # Errors
///
/// - `WorkflowError::NotFound` if the request does not exist
/// - `WorkflowError::Conflict` if the request was already accepted
pub async fn reject_request<Requests>(
    requests: &Requests,
    identifier: RequestIdentifier,
) -> WorkflowResult<bool>
where
    Requests: RequestRepository,
{
    let mut request = requests
        .find_request(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(RequestIdentifier::ENTITY_TYPE, identifier))?;

    request.reject()?;
    requests.save_request(&request).await?;

    tracing::info!(request = %identifier, "Request rejected");
    Ok(true)
}

// =============================================================================
// Create Request
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateRequestCommand {
    pub guest: UserIdentifier,
    pub event: EventIdentifier,
    pub host: UserIdentifier,
}

/// Files a pending request. Capacity is not checked here; it is only
/// enforced on acceptance.
///
/// # Errors
///
/// Returns `WorkflowError::NotFound` if the guest, event or host is missing.
pub async fn create_request<Users, Events, Requests>(
    users: &Users,
    events: &Events,
    requests: &Requests,
    command: CreateRequestCommand,
) -> WorkflowResult<Request>
where
    Users: UserRepository,
    Events: EventRepository,
    Requests: RequestRepository,
{
    let guest = require_user(users, command.guest).await?;
    let event = require_event(events, command.event).await?;
    let host = require_user(users, command.host).await?;

    let request = requests
        .insert_request(NewRequest::new(
            guest.identifier,
            host.identifier,
            event.identifier(),
        ))
        .await?;

    tracing::info!(
        request = %request.identifier(),
        guest = %guest.identifier,
        event = %event.identifier(),
        "Request created"
    );
    Ok(request)
}

async fn require_user<Users: UserRepository>(
    users: &Users,
    identifier: UserIdentifier,
) -> WorkflowResult<User> {
    users
        .find_user(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(UserIdentifier::ENTITY_TYPE, identifier))
}

async fn require_event<Events: EventRepository>(
    events: &Events,
    identifier: EventIdentifier,
) -> WorkflowResult<Event> {
    events
        .find_event(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(EventIdentifier::ENTITY_TYPE, identifier))
}

// =============================================================================
// Tests
// =============================================================================
