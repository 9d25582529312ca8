//! Presentation seam.
//!
//! Rendering is someone else's problem. The session tells a [`Presenter`]
//! what changed and where it should be shown; templates, dialogs and DOM
//! wiring live behind it.

use std::fmt;

use marta_live_transit::identifiers::{StopIdentifier, VehicleIdentifier};
use marta_live_transit::models::entities::Stop;
use marta_live_transit::proximity::ProximityReport;
use marta_live_transit::realtime::VehicleStatus;

use crate::session::Poi;

/// Where a piece of content goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Surface {
    /// The always-visible status bar for the rider's own position.
    Global,
    /// The detail view belonging to a point of interest.
    Detail(Poi),
}

/// Which position control a stop's detail view should offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopControls {
    /// "Use this stop as my position".
    MarkAsPosition,
    /// This stop already is the rider's position.
    CurrentPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Operation {
    #[strum(to_string = "load route")]
    LoadRoute,
    #[strum(to_string = "load vehicles")]
    LoadVehicles,
    #[strum(to_string = "load schedule")]
    LoadSchedule,
}

/// A failed operation, surfaced to the rider. Nothing is retried beyond the
/// normal refresh cadence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub operation: Operation,
    pub message: String,
}

impl Failure {
    pub fn new(operation: Operation, error: impl fmt::Display) -> Self {
        Self {
            operation,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.operation, self.message)
    }
}

pub trait Presenter {
    fn proximity(&mut self, surface: &Surface, report: &ProximityReport);
    fn clear_global(&mut self);

    /// Per-vehicle status line, with the rider's distance when known.
    fn vehicle_status(&mut self, status: &VehicleStatus, distance: Option<&str>);
    /// "N away" shown when a vehicle's detail view opens.
    fn vehicle_distance(&mut self, vehicle: &VehicleIdentifier, distance: &str);

    fn stop_schedule(&mut self, stop: &Stop);
    fn stop_controls(&mut self, stop: &StopIdentifier, controls: StopControls);
    fn stops_visible(&mut self, visible: bool);

    fn detail_opened(&mut self, owner: &Poi);
    fn detail_closed(&mut self, owner: &Poi);

    /// Show or hide the "we could not find you" notice.
    fn geolocation_notice(&mut self, show: bool);

    fn failure(&mut self, failure: &Failure);
}
