use std::ops::ControlFlow;
use std::sync::Arc;

use marta_live_transit::identifiers::{RouteIdentifier, StopIdentifier};
use marta_live_transit::models::wire::UpcomingResponse;
use marta_live_transit::network::{FeedError, TransitFeed};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::channel::{self, poll, UpdateChannel};
use crate::config::{ClientConfig, ConfigError};
use crate::geolocate::{locate_within, Geolocator};
use crate::map::{MapSurface, MapView};
use crate::presenter::{Failure, Operation, Presenter};
use crate::schedule;
use crate::session::{Action, ActionOutcome, Session, SessionEvent};

pub const EVENT_BUFFER: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load route {route}: {source}")]
    Route {
        route: RouteIdentifier,
        source: FeedError,
    },
}

/// Cloneable sender for feeding actions (or anything else) into a running
/// session. Sends fail once the session has stopped.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionEvent>,
}

impl SessionHandle {
    pub async fn send(&self, event: SessionEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    pub async fn action(&self, action: Action) -> bool {
        self.send(action.into()).await
    }

    pub async fn shutdown(&self) -> bool {
        self.send(SessionEvent::Shutdown).await
    }
}

/// Drives a [`Session`]: startup sequence, then one event at a time.
pub struct SessionRunner<P, M> {
    config: ClientConfig,
    session: Session<P, M>,
    feed: Arc<dyn TransitFeed>,
    geolocator: Arc<dyn Geolocator>,
    tx: mpsc::Sender<SessionEvent>,
    rx: mpsc::Receiver<SessionEvent>,
}

impl<P: Presenter, M: MapSurface> SessionRunner<P, M> {
    pub fn new(
        config: ClientConfig,
        feed: Arc<dyn TransitFeed>,
        geolocator: Arc<dyn Geolocator>,
        presenter: P,
        map: M,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let map = MapView::with_focus_zoom(map, config.focus_zoom);
        let session = Session::new(config.route_id(), presenter, map);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        Ok(Self {
            config,
            session,
            feed,
            geolocator,
            tx,
            rx,
        })
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn session(&self) -> &Session<P, M> {
        &self.session
    }

    /// Load the route and the initial schedule, kick off the first vehicle
    /// fetch, try to geolocate, then pick the update channel.
    ///
    /// Only a failed route load is fatal.
    pub async fn start(&mut self) -> Result<UpdateChannel, SessionError> {
        let route = self.session.route().clone();
        info!(route = %route, base_url = %self.config.base_url, "starting session");

        let descriptor = match self.feed.route(&route).await {
            Ok(descriptor) => descriptor,
            Err(source) => {
                self.session
                    .report_failure(&Failure::new(Operation::LoadRoute, &source));
                return Err(SessionError::Route { route, source });
            }
        };
        self.session.load_route(descriptor);

        match self.feed.upcoming(&route, None).await {
            Ok(response) => self.apply_schedule(response),
            Err(e) => self
                .session
                .report_failure(&Failure::new(Operation::LoadSchedule, e)),
        }

        self.spawn_vehicle_fetch();

        match locate_within(self.geolocator.as_ref(), self.config.geolocation_timeout()).await {
            Ok(point) => self.session.set_geolocated(point),
            Err(e) => self.session.geolocation_failed(&e),
        }

        let channel = channel::select(&self.config, self.feed.clone(), self.tx.clone()).await;
        self.session.set_channel_mode(channel.mode());
        self.session.finish_loading();

        Ok(channel)
    }

    /// Run until [`SessionEvent::Shutdown`], then hand the session back.
    pub async fn run(mut self) -> Result<Session<P, M>, SessionError> {
        let channel = self.start().await?;

        while let Some(event) = self.rx.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }

        channel.close().await;
        info!(route = %self.session.route(), "session stopped");
        Ok(self.session)
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> ControlFlow<()> {
        match event {
            SessionEvent::VehicleBatch(batch) => {
                self.session.apply_vehicle_batch(&batch);
            }
            SessionEvent::Stale(ids) => {
                self.session.evict_stale(ids);
            }
            SessionEvent::ScheduleDue(stop) => {
                if self.session.has_stop(&stop) {
                    self.spawn_schedule_fetch(Some(stop));
                } else {
                    debug!(stop = %stop, "refresh for unknown stop ignored");
                }
            }
            SessionEvent::ScheduleLoaded(response) => self.apply_schedule(response),
            SessionEvent::Geolocated(Ok(point)) => self.session.set_geolocated(point),
            SessionEvent::Geolocated(Err(e)) => self.session.geolocation_failed(&e),
            SessionEvent::Action(action) => {
                if self.session.handle_action(action) == ActionOutcome::Geolocate {
                    self.spawn_geolocate();
                }
            }
            SessionEvent::FetchFailed(failure) => self.session.report_failure(&failure),
            SessionEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn apply_schedule(&mut self, response: UpcomingResponse) {
        for (stop, after) in self.session.apply_schedule(response) {
            schedule::schedule_refresh(self.tx.clone(), stop, after);
        }
    }

    fn spawn_vehicle_fetch(&self) {
        let feed = self.feed.clone();
        let route = self.session.route().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = poll::fetch_batch(feed.as_ref(), &route).await;
            let _ = tx.send(event).await;
        });
    }

    fn spawn_schedule_fetch(&self, stop: Option<StopIdentifier>) {
        schedule::fetch_schedule(
            self.feed.clone(),
            self.session.route().clone(),
            stop,
            self.tx.clone(),
        );
    }

    fn spawn_geolocate(&self) {
        let geolocator = self.geolocator.clone();
        let timeout = self.config.geolocation_timeout();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = locate_within(geolocator.as_ref(), timeout).await;
            let _ = tx.send(SessionEvent::Geolocated(result)).await;
        });
    }
}
