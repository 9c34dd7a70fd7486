use std::time::Duration;

use rendezvous_workflow::ports::{Clock, EphemeralCache};
use rendezvous_workflow::workflows::auto_update_events;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::{AppState, RecordStore};

/// Runs the lifecycle sweep every `period` until `shutdown` flips to true.
///
/// A failed sweep is logged and retried on the next tick.
pub fn spawn_sweeper<Store, Cache, Time>(
    state: AppState<Store, Cache, Time>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_seconds = period.as_secs(), "Lifecycle sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match auto_update_events(state.paginator(), state.clock()).await {
                        Ok(report) if report.is_empty() => {
                            tracing::debug!("Sweep found nothing to close");
                        }
                        Ok(report) => {
                            tracing::info!(
                                closed = report.closed.len(),
                                rows_updated = report.rows_updated,
                                "Sweep closed events"
                            );
                        }
                        Err(error) => tracing::error!("Sweep failed: {}", error),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Lifecycle sweeper stopped");
    })
}
