use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rendezvous_domain::request::Request;
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use rendezvous_workflow::workflows::{self, CreateRequestCommand};

use super::identifier;
use crate::dto::request::CreateRequestRequest;
use crate::dto::response::{AcceptanceResponse, RejectionResponse};
use crate::errors::ApiError;
use crate::state::{AppState, RecordStore};

pub async fn create_request<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Json(request): Json<CreateRequestRequest>,
) -> Result<(StatusCode, Json<Request>), ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let command = CreateRequestCommand {
        guest: identifier("guest_id", request.guest_id)?,
        event: identifier("event_id", request.event_id)?,
        host: identifier("host_id", request.host_id)?,
    };
    let store = state.store();
    let created = workflows::create_request(store, store, store, command).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// `{"accepted": false}` means the event was full and the request is now
/// rejected.
pub async fn accept_request<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(request_id): Path<i64>,
) -> Result<Json<AcceptanceResponse>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let accepted =
        workflows::accept_request(state.store(), identifier("request_id", request_id)?).await?;
    Ok(Json(AcceptanceResponse { accepted }))
}

pub async fn reject_request<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(request_id): Path<i64>,
) -> Result<Json<RejectionResponse>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let rejected =
        workflows::reject_request(state.store(), identifier("request_id", request_id)?).await?;
    Ok(Json(RejectionResponse { rejected }))
}
