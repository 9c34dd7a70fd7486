use std::sync::Arc;

use rendezvous_infrastructure::TopicRegistry;
use rendezvous_workflow::ports::{
    Clock, EphemeralCache, EventRepository, RequestRepository, SurveyRepository, UserRepository,
    VenueRepository,
};
use rendezvous_workflow::workflows::{ActiveEventsPaginator, ListingSettings};

// =============================================================================
// RecordStore
// =============================================================================

/// A record store implementing every repository port.
pub trait RecordStore:
    UserRepository + VenueRepository + EventRepository + RequestRepository + SurveyRepository
{
}

impl<Store> RecordStore for Store where
    Store: UserRepository + VenueRepository + EventRepository + RequestRepository + SurveyRepository
{
}

// =============================================================================
// AppState
// =============================================================================

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState<Store, Cache, Time>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    store: Store,

    paginator: Arc<ActiveEventsPaginator<Store, Cache>>,

    topics: TopicRegistry,

    clock: Time,
}

impl<Store, Cache, Time> AppState<Store, Cache, Time>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    #[must_use]
    pub fn new(store: Store, cache: Cache, clock: Time, listing: ListingSettings) -> Self {
        Self::with_topics(store, cache, clock, listing, TopicRegistry::default())
    }

    #[must_use]
    pub fn with_topics(
        store: Store,
        cache: Cache,
        clock: Time,
        listing: ListingSettings,
        topics: TopicRegistry,
    ) -> Self {
        Self {
            paginator: Arc::new(ActiveEventsPaginator::new(store.clone(), cache, listing)),
            store,
            topics,
            clock,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn paginator(&self) -> &ActiveEventsPaginator<Store, Cache> {
        &self.paginator
    }

    #[must_use]
    pub const fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    #[must_use]
    pub const fn clock(&self) -> &Time {
        &self.clock
    }
}
