//! Routing definitions for the Rendezvous API.

use axum::Router;
use axum::routing::{get, post};
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::{AppState, RecordStore};

// =============================================================================
// Router Creation
// =============================================================================

/// Creates the API router with all routes under `/api/v1`.
pub fn create_router<Store, Cache, Time>(state: AppState<Store, Cache, Time>) -> Router
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/self", get(handlers::current_user::<Store, Cache, Time>))
        // Surveys
        .route("/surveys", get(handlers::surveys::<Store, Cache, Time>))
        .route(
            "/surveys/answers",
            post(handlers::answer_survey::<Store, Cache, Time>),
        )
        .route("/surveys/{id}", get(handlers::survey::<Store, Cache, Time>))
        .route(
            "/surveys/{id}/next-question",
            post(handlers::next_survey_question::<Store, Cache, Time>),
        )
        .route(
            "/surveys/{id}/updates",
            get(handlers::survey_updates::<Store, Cache, Time>),
        )
        // Venues
        .route("/buildings", get(handlers::buildings::<Store, Cache, Time>))
        .route(
            "/buildings/{id}",
            get(handlers::building::<Store, Cache, Time>),
        )
        // Users
        .route(
            "/users/{id}/profile",
            get(handlers::user_profile::<Store, Cache, Time>),
        )
        .route(
            "/users/{id}/host-requests",
            get(handlers::user_host_requests::<Store, Cache, Time>),
        )
        .route(
            "/users/{id}/guest-requests",
            get(handlers::user_guest_requests::<Store, Cache, Time>),
        )
        // Events
        .route("/events", post(handlers::create_event::<Store, Cache, Time>))
        .route(
            "/events/active",
            get(handlers::active_events::<Store, Cache, Time>),
        )
        .route(
            "/events/active/pages",
            get(handlers::active_events_page_count::<Store, Cache, Time>),
        )
        .route(
            "/events/active/pages/{page}",
            get(handlers::active_events_page::<Store, Cache, Time>),
        )
        .route(
            "/events/sweep",
            post(handlers::sweep_events::<Store, Cache, Time>),
        )
        .route(
            "/events/{id}",
            get(handlers::event_details::<Store, Cache, Time>),
        )
        .route(
            "/events/{id}/requests",
            get(handlers::event_requests::<Store, Cache, Time>),
        )
        .route(
            "/events/{id}/cancel",
            post(handlers::cancel_event::<Store, Cache, Time>),
        )
        // Requests
        .route(
            "/requests",
            post(handlers::create_request::<Store, Cache, Time>),
        )
        .route(
            "/requests/{id}/accept",
            post(handlers::accept_request::<Store, Cache, Time>),
        )
        .route(
            "/requests/{id}/reject",
            post(handlers::reject_request::<Store, Cache, Time>),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
