//! Cached, paginated listing of open events.
//!
//! Three projections share one memoized value stored under
//! [`ACTIVE_EVENTS_KEY`]: the paged structure, its flattened form and a
//! single page. The page count is memoized separately under
//! [`ACTIVE_EVENTS_PAGES_KEY`] and is only refreshed when it expires.
//! Nothing here writes through on event mutations; only deleting
//! [`ACTIVE_EVENTS_KEY`] forces an early recomputation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::WorkflowError;
use crate::ports::{EphemeralCache, EventRepository, WorkflowResult};
use crate::views::ActiveEvent;

// =============================================================================
// Listing Configuration
// =============================================================================

pub const ACTIVE_EVENTS_KEY: &str = "activeEvents";

pub const ACTIVE_EVENTS_PAGES_KEY: &str = "activeEventsPages";

pub const EVENTS_PER_PAGE: usize = 9;

pub const ACTIVE_EVENTS_TIME_TO_LIVE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub page_size: usize,
    pub time_to_live: Duration,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: EVENTS_PER_PAGE,
            time_to_live: ACTIVE_EVENTS_TIME_TO_LIVE,
        }
    }
}

// =============================================================================
// ActiveEventPages
// =============================================================================

/// Open events grouped into fixed-size pages, in ascending event order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveEventPages(Vec<Vec<ActiveEvent>>);

impl ActiveEventPages {
    /// Splits `events` into consecutive pages of `page_size` (at least 1).
    /// Only the last page may be shorter.
    #[must_use]
    pub fn paginate(events: Vec<ActiveEvent>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let mut pages: Vec<Vec<ActiveEvent>> = Vec::with_capacity(events.len().div_ceil(page_size));
        for event in events {
            match pages.last_mut() {
                Some(page) if page.len() < page_size => page.push(event),
                _ => pages.push(vec![event]),
            }
        }
        Self(pages)
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.0.len()
    }

    /// 1-indexed page lookup; page 0 and pages past the end are absent.
    #[must_use]
    pub fn page(&self, number: usize) -> Option<&[ActiveEvent]> {
        number
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn pages(&self) -> &[Vec<ActiveEvent>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEvent> {
        self.0.iter().flatten()
    }

    #[must_use]
    pub fn flatten(self) -> Vec<ActiveEvent> {
        self.0.into_iter().flatten().collect()
    }
}

// =============================================================================
// ActiveEventsPaginator
// =============================================================================

#[derive(Debug, Clone)]
pub struct ActiveEventsPaginator<Events, Cache> {
    events: Events,
    cache: Cache,
    settings: ListingSettings,
}

impl<Events, Cache> ActiveEventsPaginator<Events, Cache>
where
    Events: EventRepository,
    Cache: EphemeralCache,
{
    #[must_use]
    pub const fn new(events: Events, cache: Cache, settings: ListingSettings) -> Self {
        Self {
            events,
            cache,
            settings,
        }
    }

    #[must_use]
    pub const fn events(&self) -> &Events {
        &self.events
    }

    #[must_use]
    pub const fn settings(&self) -> ListingSettings {
        self.settings
    }

    /// The memoized paged listing.
    ///
    /// On a miss the listing is computed from the record store and cached
    /// for the configured time-to-live.
    ///
    /// # Errors
    ///
    /// Propagates record store and cache failures.
    pub async fn get_active_events(&self) -> WorkflowResult<ActiveEventPages> {
        if let Some(cached) = self.cache.get(ACTIVE_EVENTS_KEY).await? {
            match serde_json::from_str::<ActiveEventPages>(&cached) {
                Ok(pages) => {
                    tracing::debug!("Serving activeEvents from cache");
                    return Ok(pages);
                }
                Err(error) => {
                    tracing::warn!("Discarding unreadable activeEvents cache entry: {}", error);
                }
            }
        }

        let open_events = self.events.find_open_events().await?;
        let pages = ActiveEventPages::paginate(open_events, self.settings.page_size);
        let serialized = serde_json::to_string(&pages)
            .map_err(|error| WorkflowError::cache("serialize", error.to_string()))?;

        tracing::info!(
            pages = pages.page_count(),
            "Setting cache for activeEvents"
        );
        self.cache
            .set(ACTIVE_EVENTS_KEY, serialized, self.settings.time_to_live)
            .await?;

        Ok(pages)
    }

    /// # Errors
    ///
    /// Propagates record store and cache failures.
    pub async fn active_events(&self) -> WorkflowResult<Vec<ActiveEvent>> {
        Ok(self.get_active_events().await?.flatten())
    }

    /// # Errors
    ///
    /// Propagates record store and cache failures.
    pub async fn active_events_page(
        &self,
        page: usize,
    ) -> WorkflowResult<Option<Vec<ActiveEvent>>> {
        let pages = self.get_active_events().await?;
        Ok(pages.page(page).map(<[ActiveEvent]>::to_vec))
    }

    /// The memoized page count, kept under its own key.
    ///
    /// # Errors
    ///
    /// Propagates record store and cache failures.
    pub async fn active_events_pages(&self) -> WorkflowResult<usize> {
        if let Some(cached) = self.cache.get(ACTIVE_EVENTS_PAGES_KEY).await? {
            match cached.trim().parse::<usize>() {
                Ok(count) => return Ok(count),
                Err(error) => {
                    tracing::warn!(
                        "Discarding unreadable activeEventsPages cache entry: {}",
                        error
                    );
                }
            }
        }

        let count = self.get_active_events().await?.page_count();

        tracing::info!(pages = count, "Setting cache for activeEventsPages");
        self.cache
            .set(
                ACTIVE_EVENTS_PAGES_KEY,
                count.to_string(),
                self.settings.time_to_live,
            )
            .await?;

        Ok(count)
    }

    /// Drops the shared listing so the next read recomputes it.
    /// The page count entry is left alone.
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub async fn invalidate(&self) -> WorkflowResult<()> {
        tracing::info!("Dropping cache for activeEvents");
        self.cache.delete(ACTIVE_EVENTS_KEY).await
    }
}

// =============================================================================
// Tests
// =============================================================================
