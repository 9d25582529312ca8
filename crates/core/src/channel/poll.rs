use std::sync::Arc;
use std::time::Duration;

use marta_live_transit::identifiers::RouteIdentifier;
use marta_live_transit::network::TransitFeed;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::presenter::{Failure, Operation};
use crate::session::SessionEvent;

/// Background task fetching the full realtime batch on a fixed interval.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Fetch one realtime batch and wrap the outcome as an event.
pub async fn fetch_batch(feed: &dyn TransitFeed, route: &RouteIdentifier) -> SessionEvent {
    match feed.realtime(route).await {
        Ok(batch) => SessionEvent::VehicleBatch(batch),
        Err(e) => SessionEvent::FetchFailed(Failure::new(Operation::LoadVehicles, e)),
    }
}

/// Start polling. The first tick is one full period out; the initial batch
/// is loaded separately at startup.
pub fn start(
    feed: Arc<dyn TransitFeed>,
    route: RouteIdentifier,
    every: Duration,
    tx: mpsc::Sender<SessionEvent>,
) -> PollHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            debug!(route = %route, "polling realtime batch");
            let event = fetch_batch(feed.as_ref(), &route).await;
            if tx.send(event).await.is_err() {
                debug!("session gone; polling stopped");
                break;
            }
        }
    });

    PollHandle { task }
}
