use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rendezvous_domain::event::Event;
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use rendezvous_workflow::views::ActiveEvent;
use rendezvous_workflow::workflows::{
    self, ActiveEventPages, CreateEventCommand, SweepReport, auto_update_events,
};

use super::identifier;
use crate::dto::request::CreateEventRequest;
use crate::dto::response::{CancellationResponse, PageCountResponse};
use crate::errors::ApiError;
use crate::state::{AppState, RecordStore};

// =============================================================================
// Active Listing
// =============================================================================

/// The open events grouped into pages.
pub async fn active_events<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
) -> Result<Json<ActiveEventPages>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    Ok(Json(state.paginator().get_active_events().await?))
}

pub async fn active_events_page_count<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
) -> Result<Json<PageCountResponse>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let pages = state.paginator().active_events_pages().await?;
    Ok(Json(PageCountResponse { pages }))
}

/// One page, numbered from 1; `null` past the last page.
pub async fn active_events_page<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(page): Path<usize>,
) -> Result<Json<Option<Vec<ActiveEvent>>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    Ok(Json(state.paginator().active_events_page(page).await?))
}

// =============================================================================
// Management
// =============================================================================

pub async fn create_event<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let command = CreateEventCommand {
        title: request.title,
        description: request.description,
        start_time: request.start_time,
        end_time: request.end_time,
        max_guest_count: request.max_guest_count,
        guest_count: request.guest_count,
        host: identifier("host_id", request.host_id)?,
        location: identifier("location_id", request.location_id)?,
    };
    let store = state.store();
    let event = workflows::create_event(store, store, store, command).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn cancel_event<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(event_id): Path<i64>,
) -> Result<Json<CancellationResponse>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let cancelled =
        workflows::cancel_event(state.store(), identifier("event_id", event_id)?).await?;
    Ok(Json(CancellationResponse { cancelled }))
}

/// Runs the lifecycle sweep now, outside the periodic schedule.
pub async fn sweep_events<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
) -> Result<Json<SweepReport>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    Ok(Json(auto_update_events(state.paginator(), state.clock()).await?))
}
