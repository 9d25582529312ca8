//! Concrete entities: stops, vehicles, and the observer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::identifiers::*;
use crate::models::traits::TrackedEntity;
use crate::models::types::*;
use crate::spatial::GeoPoint;

// ============================================================================
// Stop
// ============================================================================

/// Upcoming arrivals at a stop and how long until they should be re-fetched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopSchedule {
    pub times: Vec<String>,
    pub refresh: Duration,
}

#[derive(Clone, Debug)]
pub struct Stop {
    id: StopIdentifier,
    name: Arc<str>,
    position: GeoPoint,
    schedule: Option<StopSchedule>,
    visible: bool,
}

#[derive(Clone, Debug)]
pub struct StopAttrs {
    pub name: Arc<str>,
}

impl Stop {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schedule(&self) -> Option<&StopSchedule> {
        self.schedule.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_schedule(&mut self, schedule: StopSchedule) {
        self.schedule = Some(schedule);
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl TrackedEntity for Stop {
    type Id = StopIdentifier;
    type Attrs = StopAttrs;

    fn create(id: StopIdentifier, position: GeoPoint, attrs: StopAttrs) -> Self {
        // Stops start hidden; the rider toggles them on as a group
        Self {
            id,
            name: attrs.name,
            position,
            schedule: None,
            visible: false,
        }
    }

    fn id(&self) -> &StopIdentifier {
        &self.id
    }

    fn position(&self) -> GeoPoint {
        self.position
    }

    fn relocate(&mut self, position: GeoPoint) {
        self.position = position;
    }

    fn apply(&mut self, attrs: StopAttrs) {
        self.name = attrs.name;
    }
}

// ============================================================================
// Vehicle
// ============================================================================

#[derive(Clone, Debug)]
pub struct Vehicle {
    id: VehicleIdentifier,
    position: GeoPoint,
    direction: Direction,
    adherence: i32,
    status_time: Arc<str>,
    last_update: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleAttrs {
    pub direction: Direction,
    /// Signed minutes; negative is behind schedule.
    pub adherence: i32,
    pub status_time: Arc<str>,
}

impl Vehicle {
    pub fn direction(&self) -> &Direction {
        &self.direction
    }

    pub fn adherence(&self) -> i32 {
        self.adherence
    }

    pub fn schedule_status(&self) -> ScheduleStatus {
        ScheduleStatus::from_adherence(self.adherence)
    }

    /// Status timestamp as reported by the server.
    pub fn status_time(&self) -> &str {
        &self.status_time
    }

    /// When this client last applied an observation for the vehicle.
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}

impl TrackedEntity for Vehicle {
    type Id = VehicleIdentifier;
    type Attrs = VehicleAttrs;

    fn create(id: VehicleIdentifier, position: GeoPoint, attrs: VehicleAttrs) -> Self {
        Self {
            id,
            position,
            direction: attrs.direction,
            adherence: attrs.adherence,
            status_time: attrs.status_time,
            last_update: Utc::now(),
        }
    }

    fn id(&self) -> &VehicleIdentifier {
        &self.id
    }

    fn position(&self) -> GeoPoint {
        self.position
    }

    fn relocate(&mut self, position: GeoPoint) {
        self.position = position;
    }

    fn apply(&mut self, attrs: VehicleAttrs) {
        self.direction = attrs.direction;
        self.adherence = attrs.adherence;
        self.status_time = attrs.status_time;
        self.last_update = Utc::now();
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Where the observer position came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserverSource {
    /// The rider's own geolocated position.
    Geolocated,
    /// A stop the rider picked to stand in for their position.
    Stop(StopIdentifier),
}

/// The point proximity is measured from. A session holds at most one.
#[derive(Clone, Debug, PartialEq)]
pub struct Observer {
    pub position: GeoPoint,
    pub source: ObserverSource,
}

impl Observer {
    pub fn geolocated(position: GeoPoint) -> Self {
        Self {
            position,
            source: ObserverSource::Geolocated,
        }
    }

    pub fn at_stop(stop: &Stop) -> Self {
        Self {
            position: stop.position(),
            source: ObserverSource::Stop(stop.id().clone()),
        }
    }

    pub fn is_geolocated(&self) -> bool {
        self.source == ObserverSource::Geolocated
    }

    pub fn stop(&self) -> Option<&StopIdentifier> {
        match &self.source {
            ObserverSource::Stop(id) => Some(id),
            ObserverSource::Geolocated => None,
        }
    }
}
