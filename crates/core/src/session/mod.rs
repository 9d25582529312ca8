//! Application state for one tracked route.
//!
//! A [`Session`] owns the registries, the observer and the detail view, and
//! turns each incoming event into registry updates plus presenter and map
//! calls. It never awaits; [`SessionRunner`] drives it from a single task.

mod event;
mod runner;
mod select;
mod surface;

pub use event::{Action, ActionOutcome, SessionEvent};
pub use runner::{SessionError, SessionHandle, SessionRunner, EVENT_BUFFER};
pub use surface::{DetailSurface, Poi, Selectable};

use std::time::Duration;

use marta_live_transit::geo::{LineString, Rect};
use marta_live_transit::identifiers::{RouteIdentifier, StopIdentifier, VehicleIdentifier};
use marta_live_transit::models::entities::{Observer, ObserverSource, Stop, Vehicle};
use marta_live_transit::models::traits::TrackedEntity;
use marta_live_transit::models::wire::{RouteDescriptor, UpcomingResponse};
use marta_live_transit::proximity::{self, ProximityReport};
use marta_live_transit::realtime::{BatchReport, Reconciler};
use marta_live_transit::registry::Registry;
use marta_live_transit::spatial::GeoPoint;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::channel::ChannelMode;
use crate::geolocate::GeolocationError;
use crate::map::{MapSurface, MapView};
use crate::presenter::{Failure, Presenter, StopControls, Surface};

pub struct Session<P, M> {
    route: RouteIdentifier,
    reconciler: Reconciler,
    stops: Registry<Stop>,
    vehicles: Registry<Vehicle>,
    observer: Option<Observer>,
    channel: Option<ChannelMode>,
    detail: DetailSurface,
    watching: Option<VehicleIdentifier>,
    stops_visible: bool,
    shapes: Vec<LineString>,
    bounds: Option<Rect>,
    /// Set by an explicit geolocate request so the next fix is focused.
    refocus_on_fix: bool,
    presenter: P,
    map: MapView<M>,
}

/// The detail view the observer's proximity is written to.
fn observer_poi(observer: &Observer) -> Poi {
    match &observer.source {
        ObserverSource::Geolocated => Poi::Observer,
        ObserverSource::Stop(id) => Poi::Stop(id.clone()),
    }
}

impl<P: Presenter, M: MapSurface> Session<P, M> {
    pub fn new(route: RouteIdentifier, presenter: P, map: MapView<M>) -> Self {
        Self {
            reconciler: Reconciler::new(route.clone()),
            route,
            stops: Registry::new(),
            vehicles: Registry::new(),
            observer: None,
            channel: None,
            detail: DetailSurface::default(),
            watching: None,
            stops_visible: false,
            shapes: Vec::new(),
            bounds: None,
            refocus_on_fix: false,
            presenter,
            map,
        }
    }

    pub fn route(&self) -> &RouteIdentifier {
        &self.route
    }

    pub fn stops(&self) -> &Registry<Stop> {
        &self.stops
    }

    pub fn vehicles(&self) -> &Registry<Vehicle> {
        &self.vehicles
    }

    pub fn observer(&self) -> Option<&Observer> {
        self.observer.as_ref()
    }

    pub fn channel_mode(&self) -> Option<ChannelMode> {
        self.channel
    }

    pub fn detail_owner(&self) -> Option<&Poi> {
        self.detail.owner()
    }

    pub fn watching(&self) -> Option<&VehicleIdentifier> {
        self.watching.as_ref()
    }

    pub fn stops_visible(&self) -> bool {
        self.stops_visible
    }

    pub fn shapes(&self) -> &[LineString] {
        &self.shapes
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn has_stop(&self, id: &StopIdentifier) -> bool {
        self.stops.contains(id)
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn map(&self) -> &MapView<M> {
        &self.map
    }

    pub fn into_parts(self) -> (P, M) {
        (self.presenter, self.map.into_surface())
    }

    /// Record how updates arrive. Decided once; later calls are ignored.
    pub fn set_channel_mode(&mut self, mode: ChannelMode) {
        if let Some(current) = self.channel {
            if current != mode {
                warn!(?current, ignored = ?mode, "update channel already selected");
            }
            return;
        }
        info!(?mode, route = %self.route, "update channel selected");
        self.channel = Some(mode);
    }

    // ========================================================================
    // Route and schedule
    // ========================================================================

    pub fn load_route(&mut self, descriptor: RouteDescriptor) {
        self.shapes = descriptor.line_strings();
        self.bounds = descriptor.bounds();
        for stop in &descriptor.stops {
            self.stops.upsert(stop.id.clone(), stop.pt, stop.attrs());
        }
        self.stops.set_all_visible(self.stops_visible);

        info!(
            route = %self.route,
            stops = self.stops.len(),
            shapes = self.shapes.len(),
            "route loaded"
        );
    }

    /// Attach upcoming times to known stops. Returns when each updated stop
    /// wants to be refreshed.
    pub fn apply_schedule(&mut self, response: UpcomingResponse) -> Vec<(StopIdentifier, Duration)> {
        let mut refreshes = Vec::with_capacity(response.len());

        for (id, upcoming) in response {
            let after = upcoming.refresh_after();
            if !self.stops.attach_schedule(&id, upcoming.into_schedule()) {
                debug!(stop = %id, "schedule for unknown stop ignored");
                continue;
            }

            if let Some(stop) = self.stops.get(&id) {
                self.presenter.stop_schedule(stop);
            }
            let controls = self.controls_for(&id);
            self.presenter.stop_controls(&id, controls);
            refreshes.push((id, after));
        }

        refreshes
    }

    fn controls_for(&self, stop: &StopIdentifier) -> StopControls {
        match self.observer.as_ref().and_then(Observer::stop) {
            Some(current) if current == stop => StopControls::CurrentPosition,
            _ => StopControls::MarkAsPosition,
        }
    }

    // ========================================================================
    // Vehicles
    // ========================================================================

    pub fn apply_vehicle_batch(&mut self, batch: &[Value]) -> BatchReport {
        let report = self.reconciler.apply_batch(&mut self.vehicles, batch);
        self.after_reconcile(&report);
        report
    }

    pub fn evict_stale(&mut self, ids: impl IntoIterator<Item = VehicleIdentifier>) -> BatchReport {
        let report = self.reconciler.evict_stale(&mut self.vehicles, ids);
        self.after_reconcile(&report);
        report
    }

    fn after_reconcile(&mut self, report: &BatchReport) {
        for id in report.removed() {
            self.forget_vehicle(id);
        }

        if let Some(watched) = &self.watching {
            if report.moved().any(|id| id == watched) {
                if let Some(position) = self.vehicles.get(watched).map(|v| v.position()) {
                    debug!(vehicle = %watched, "following watched vehicle");
                    self.map.focus(position, None);
                }
            }
        }

        for status in &report.statuses {
            let distance = self
                .observer
                .as_ref()
                .map(|o| o.position.human_distance_to(&status.position));
            self.presenter.vehicle_status(status, distance.as_deref());
        }

        self.refresh_proximity();
    }

    fn forget_vehicle(&mut self, id: &VehicleIdentifier) {
        if self.watching.as_ref() == Some(id) {
            self.watching = None;
        }
        if self.detail.is_owned_by(&Poi::Vehicle(id.clone())) {
            self.dismiss();
        }
    }

    // ========================================================================
    // Observer
    // ========================================================================

    /// Rank vehicles against the observer and publish the result. Published
    /// to the global surface too when the observer is geolocated.
    pub fn refresh_proximity(&mut self) -> Option<ProximityReport> {
        let observer = self.observer.as_ref()?;
        let report = proximity::rank(observer.position, self.vehicles.all());
        let surface = Surface::Detail(observer_poi(observer));
        let global = observer.is_geolocated();

        self.presenter.proximity(&surface, &report);
        if global {
            self.presenter.proximity(&Surface::Global, &report);
        }
        Some(report)
    }

    pub fn set_geolocated(&mut self, point: GeoPoint) {
        let first_fix = self.observer.is_none();
        let refocus = std::mem::take(&mut self.refocus_on_fix);

        if let Some(stop) = self.observer.as_ref().and_then(Observer::stop) {
            self.presenter.stop_controls(stop, StopControls::MarkAsPosition);
        }
        self.observer = Some(Observer::geolocated(point));
        self.presenter.geolocation_notice(false);
        debug!(lat = point.lat(), lng = point.lng(), "observer geolocated");

        if first_fix || refocus {
            self.focus_observer();
        } else {
            self.refresh_proximity();
        }
    }

    /// The session carries on without an observer.
    pub fn geolocation_failed(&mut self, error: &GeolocationError) {
        warn!("geolocation failed: {error}");
        self.refocus_on_fix = false;

        if let Some(observer) = self.observer.take() {
            if self.detail.is_owned_by(&observer_poi(&observer)) {
                self.dismiss();
            }
            if let Some(stop) = observer.stop() {
                self.presenter.stop_controls(stop, StopControls::MarkAsPosition);
            }
        }

        self.presenter.clear_global();
        self.presenter.geolocation_notice(true);
    }

    /// Use a stop as the rider's position. Returns false for unknown stops.
    pub fn mark_stop_as_observer(&mut self, id: &StopIdentifier) -> bool {
        let Some(stop) = self.stops.get(id) else {
            debug!(stop = %id, "cannot mark unknown stop as position");
            return false;
        };
        let observer = Observer::at_stop(stop);
        let position = observer.position;

        match self.observer.as_ref() {
            Some(previous) if previous.is_geolocated() => self.presenter.clear_global(),
            Some(previous) => {
                if let Some(stop) = previous.stop().filter(|s| *s != id) {
                    self.presenter.stop_controls(stop, StopControls::MarkAsPosition);
                }
            }
            None => {}
        }

        self.observer = Some(observer);
        self.refocus_on_fix = false;
        self.presenter.geolocation_notice(false);
        self.presenter.stop_controls(id, StopControls::CurrentPosition);
        info!(stop = %id, "stop marked as position");

        self.map.focus(position, None);
        self.select(Poi::Observer);
        true
    }

    fn focus_observer(&mut self) {
        let Some(position) = self.observer.as_ref().map(|o| o.position) else {
            return;
        };
        self.map.focus(position, None);
        self.select(Poi::Observer);
    }

    // ========================================================================
    // Detail view
    // ========================================================================

    fn resolve(&self, poi: Poi) -> Option<Poi> {
        let known = match &poi {
            Poi::Observer => return self.observer.as_ref().map(observer_poi),
            Poi::Stop(id) => self.stops.contains(id),
            Poi::Vehicle(id) => self.vehicles.contains(id),
        };
        known.then_some(poi)
    }

    /// Give the detail view to `poi`, closing whoever had it.
    pub fn select(&mut self, poi: Poi) {
        let Some(poi) = self.resolve(poi.clone()) else {
            debug!(?poi, "ignoring selection of unknown point");
            return;
        };

        if let Some(previous) = self.detail.swap(poi.clone()) {
            self.presenter.detail_closed(&previous);
            previous.on_dismiss(self);
        }
        self.presenter.detail_opened(&poi);
        poi.on_select(self);
    }

    pub fn dismiss(&mut self) {
        if let Some(previous) = self.detail.take() {
            self.presenter.detail_closed(&previous);
            previous.on_dismiss(self);
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn handle_action(&mut self, action: Action) -> ActionOutcome {
        debug!(?action, "handling action");
        match action {
            Action::Select(poi) => self.select(poi),
            Action::Dismiss => self.dismiss(),
            Action::ToggleStops => self.toggle_stops(),
            Action::FindMe => self.find_me(),
            Action::Geolocate => {
                let shown = self.observer.as_ref().map(observer_poi);
                if shown.is_some_and(|poi| self.detail.is_owned_by(&poi)) {
                    self.dismiss();
                }
                self.refocus_on_fix = true;
                return ActionOutcome::Geolocate;
            }
            Action::MarkMe(stop) => {
                self.mark_stop_as_observer(&stop);
            }
            Action::WatchVehicle(id) => self.select(Poi::Vehicle(id)),
            Action::Resize => self.map.resize(),
        }
        ActionOutcome::Done
    }

    fn toggle_stops(&mut self) {
        self.stops_visible = !self.stops_visible;
        self.stops.set_all_visible(self.stops_visible);
        if !self.stops_visible && matches!(self.detail.owner(), Some(Poi::Stop(_))) {
            self.dismiss();
        }
        self.presenter.stops_visible(self.stops_visible);
    }

    fn find_me(&mut self) {
        let Some(position) = self.observer.as_ref().map(|o| o.position) else {
            debug!("no position to find");
            return;
        };
        self.select(Poi::Observer);
        self.map.focus(position, None);
    }

    /// Initial viewport: the observer if there is one, else the whole route.
    pub fn finish_loading(&mut self) {
        if let Some(position) = self.observer.as_ref().map(|o| o.position) {
            self.map.focus(position, None);
        } else if let Some(bounds) = self.bounds {
            self.map.fit_bounds(bounds);
        }

        info!(
            route = %self.route,
            vehicles = self.vehicles.len(),
            mode = ?self.channel,
            "session ready"
        );
    }

    pub fn report_failure(&mut self, failure: &Failure) {
        warn!("{failure}");
        self.presenter.failure(failure);
    }
}
