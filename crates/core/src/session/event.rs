use marta_live_transit::identifiers::{StopIdentifier, VehicleIdentifier};
use marta_live_transit::models::wire::UpcomingResponse;
use marta_live_transit::spatial::GeoPoint;
use serde_json::Value;

use crate::geolocate::GeolocationError;
use crate::presenter::Failure;
use crate::session::Poi;

/// Everything the session loop reacts to. Producers only ever send these;
/// the loop applies them one at a time.
#[derive(Debug)]
pub enum SessionEvent {
    /// Raw realtime records, from a push message or a poll response.
    VehicleBatch(Vec<Value>),
    /// Vehicles the server declared stale.
    Stale(Vec<VehicleIdentifier>),
    /// A stop's refresh timer fired.
    ScheduleDue(StopIdentifier),
    ScheduleLoaded(UpcomingResponse),
    Geolocated(Result<GeoPoint, GeolocationError>),
    Action(Action),
    FetchFailed(Failure),
    Shutdown,
}

/// Rider-initiated actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// A marker was clicked.
    Select(Poi),
    /// The detail view was closed.
    Dismiss,
    ToggleStops,
    /// Jump to the rider's position.
    FindMe,
    /// Ask for a fresh geolocation fix.
    Geolocate,
    /// Use this stop as the rider's position.
    MarkMe(StopIdentifier),
    WatchVehicle(VehicleIdentifier),
    /// The map container changed size.
    Resize,
}

impl From<Action> for SessionEvent {
    fn from(action: Action) -> Self {
        SessionEvent::Action(action)
    }
}

/// What the caller still has to do after an action was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Start a geolocation request and feed its result back.
    Geolocate,
}
