//! Event lifecycle sweep.

use chrono::{DateTime, Utc};
use rendezvous_domain::common::EventIdentifier;
use serde::Serialize;

use super::active_events::ActiveEventsPaginator;
use crate::ports::{Clock, EphemeralCache, EventRepository, WorkflowResult};
use crate::views::ActiveEvent;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Events found full or past their end, in ascending order.
    pub closed: Vec<EventIdentifier>,
    /// Rows actually moved to closed; lower than `closed.len()` when some
    /// of them were cancelled or closed since the listing was cached.
    pub rows_updated: u64,
}

impl SweepReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Step 1: Select [Pure]
// -----------------------------------------------------------------------------

fn select_inactive(events: &[ActiveEvent], now: DateTime<Utc>) -> Vec<EventIdentifier> {
    let mut inactive: Vec<EventIdentifier> = events
        .iter()
        .filter(|entry| entry.event.should_close(now))
        .map(|entry| entry.event.identifier())
        .collect();
    inactive.sort_unstable();
    inactive.dedup();
    inactive
}

// -----------------------------------------------------------------------------
// Step 2: Close and Invalidate [IO]
// -----------------------------------------------------------------------------

/// Closes every listed event that is full or has ended.
///
/// The listing comes from the memoized active-event cache and may be up to
/// one time-to-live stale. Closing is a single batched write that only
/// touches rows still open. The shared listing is dropped when at least one
/// event was selected; the page count entry is not.
///
/// # Errors
///
/// Propagates record store and cache failures.
pub async fn auto_update_events<Events, Cache, Time>(
    paginator: &ActiveEventsPaginator<Events, Cache>,
    clock: &Time,
) -> WorkflowResult<SweepReport>
where
    Events: EventRepository,
    Cache: EphemeralCache,
    Time: Clock,
{
    let now = clock.now();
    let listing = paginator.active_events().await?;
    let closed = select_inactive(&listing, now);

    if closed.is_empty() {
        tracing::debug!(checked = listing.len(), "Sweep found nothing to close");
        return Ok(SweepReport::default());
    }

    let rows_updated = paginator.events().close_events(&closed).await?;
    paginator.invalidate().await?;

    tracing::info!(
        selected = closed.len(),
        rows_updated,
        "Closed inactive events"
    );
    Ok(SweepReport {
        closed,
        rows_updated,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCache, FakeClock, FakeStore, fixed_now};
    use crate::workflows::active_events::{
        ACTIVE_EVENTS_KEY, ACTIVE_EVENTS_PAGES_KEY, ListingSettings,
    };
    use chrono::Duration;
    use rendezvous_domain::event::EventStatus;
    use rstest::rstest;

    fn paginator(
        store: &FakeStore,
        cache: &FakeCache,
    ) -> ActiveEventsPaginator<FakeStore, FakeCache> {
        ActiveEventsPaginator::new(store.clone(), cache.clone(), ListingSettings::default())
    }

    #[rstest]
    #[tokio::test]
    async fn closes_ended_and_full_events_only() {
        let store = FakeStore::seeded();
        let ended = store.add_event_ending(1, 0, 10, fixed_now() - Duration::minutes(5));
        let upcoming = store.add_event_ending(1, 3, 10, fixed_now() + Duration::hours(3));
        let full = store.add_event(1, 4, 4);
        let cache = FakeCache::default();

        let report = auto_update_events(&paginator(&store, &cache), &FakeClock::default())
            .await
            .unwrap();

        assert_eq!(report.closed, vec![ended, full]);
        assert_eq!(report.rows_updated, 2);
        assert_eq!(store.event(ended).status(), EventStatus::Closed);
        assert_eq!(store.event(full).status(), EventStatus::Closed);
        assert_eq!(store.event(upcoming).status(), EventStatus::Open);
    }

    #[rstest]
    #[tokio::test]
    async fn invalidates_listing_but_not_page_count() {
        let store = FakeStore::seeded();
        store.add_event_ending(1, 0, 10, fixed_now() - Duration::minutes(5));
        let cache = FakeCache::default();
        let paginator = paginator(&store, &cache);
        paginator.active_events_pages().await.unwrap();

        auto_update_events(&paginator, &FakeClock::default())
            .await
            .unwrap();

        assert!(cache.peek(ACTIVE_EVENTS_KEY).is_none());
        assert_eq!(cache.peek(ACTIVE_EVENTS_PAGES_KEY).as_deref(), Some("1"));
    }

    #[rstest]
    #[tokio::test]
    async fn nothing_to_close_keeps_cache_and_skips_write() {
        let store = FakeStore::seeded();
        store.add_event(1, 0, 10);
        let cache = FakeCache::default();

        let report = auto_update_events(&paginator(&store, &cache), &FakeClock::default())
            .await
            .unwrap();

        assert!(report.is_empty());
        assert!(cache.peek(ACTIVE_EVENTS_KEY).is_some());
        assert_eq!(store.close_calls(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn event_ending_exactly_now_stays_open() {
        let store = FakeStore::seeded();
        let event = store.add_event_ending(1, 0, 10, fixed_now());
        let cache = FakeCache::default();

        auto_update_events(&paginator(&store, &cache), &FakeClock::default())
            .await
            .unwrap();

        assert_eq!(store.event(event).status(), EventStatus::Open);
    }

    #[rstest]
    #[tokio::test]
    async fn stale_listing_never_overwrites_cancellation() {
        let store = FakeStore::seeded();
        let event = store.add_event_ending(1, 0, 10, fixed_now() - Duration::minutes(1));
        let cache = FakeCache::default();
        let paginator = paginator(&store, &cache);
        paginator.get_active_events().await.unwrap();
        store.set_status(event, EventStatus::Cancelled);

        let report = auto_update_events(&paginator, &FakeClock::default())
            .await
            .unwrap();

        assert_eq!(report.closed, vec![event]);
        assert_eq!(report.rows_updated, 0);
        assert_eq!(store.event(event).status(), EventStatus::Cancelled);
    }
}
