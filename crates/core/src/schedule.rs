//! Per-stop schedule refresh.
//!
//! Each stop's upcoming times carry their own refresh interval, so every
//! stop gets its own one-shot timer. Timers are never cancelled; one that
//! fires for a stop the session no longer knows is ignored there.

use std::sync::Arc;
use std::time::Duration;

use marta_live_transit::identifiers::{RouteIdentifier, StopIdentifier};
use marta_live_transit::network::TransitFeed;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::presenter::{Failure, Operation};
use crate::session::SessionEvent;

/// Send [`SessionEvent::ScheduleDue`] for `stop` once `after` has elapsed.
pub fn schedule_refresh(
    tx: mpsc::Sender<SessionEvent>,
    stop: StopIdentifier,
    after: Duration,
) -> JoinHandle<()> {
    debug!(stop = %stop, secs = after.as_secs(), "schedule refresh queued");
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let _ = tx.send(SessionEvent::ScheduleDue(stop)).await;
    })
}

/// Fetch upcoming times for the whole route, or for one stop, and send the
/// outcome back as an event.
pub fn fetch_schedule(
    feed: Arc<dyn TransitFeed>,
    route: RouteIdentifier,
    stop: Option<StopIdentifier>,
    tx: mpsc::Sender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let event = match feed.upcoming(&route, stop.as_ref()).await {
            Ok(response) => SessionEvent::ScheduleLoaded(response),
            Err(e) => SessionEvent::FetchFailed(Failure::new(Operation::LoadSchedule, e)),
        };
        let _ = tx.send(event).await;
    })
}
