//! Directional proximity: which vehicle is nearest, and which is next to
//! arrive, for each direction of travel.
//!
//! Both lists reduce each direction group with the same pairwise rule: keep
//! the running candidate `a` only if the observer-relative closer of `(a, b)`
//! sits exactly where `a` does, otherwise take `b`. Vehicles at identical
//! positions therefore resolve to the earlier one, while equidistant vehicles
//! at different positions resolve to the later one.

use std::collections::BTreeMap;

use crate::identifiers::VehicleIdentifier;
use crate::models::entities::Vehicle;
use crate::models::traits::TrackedEntity;
use crate::models::types::Direction;
use crate::spatial::{human_distance, GeoPoint};

/// One winner of a direction group.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedVehicle {
    pub id: VehicleIdentifier,
    pub direction: Direction,
    pub position: GeoPoint,
    pub distance_m: f64,
}

impl RankedVehicle {
    pub fn human_distance(&self) -> String {
        human_distance(self.distance_m)
    }
}

/// Per-direction winners, each list ordered by direction label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProximityReport {
    /// Closest vehicle per direction, heading ignored.
    pub near: Vec<RankedVehicle>,
    /// Closest vehicle per direction among those still approaching.
    pub next: Vec<RankedVehicle>,
}

impl ProximityReport {
    pub fn near_for(&self, label: &str) -> Option<&RankedVehicle> {
        self.near.iter().find(|r| r.direction.label() == label)
    }

    pub fn next_for(&self, label: &str) -> Option<&RankedVehicle> {
        self.next.iter().find(|r| r.direction.label() == label)
    }

    pub fn is_empty(&self) -> bool {
        self.near.is_empty() && self.next.is_empty()
    }
}

/// Rank `vehicles` (in registry order) relative to `observer`.
pub fn rank<'a>(
    observer: GeoPoint,
    vehicles: impl IntoIterator<Item = &'a Vehicle>,
) -> ProximityReport {
    let vehicles: Vec<&Vehicle> = vehicles.into_iter().collect();

    let near = reduce_by_direction(observer, vehicles.iter().copied());
    let next = reduce_by_direction(
        observer,
        vehicles
            .iter()
            .copied()
            .filter(|v| v.direction().approaches(v.position(), observer)),
    );

    ProximityReport { near, next }
}

fn reduce_by_direction<'a>(
    observer: GeoPoint,
    vehicles: impl Iterator<Item = &'a Vehicle>,
) -> Vec<RankedVehicle> {
    let mut groups: BTreeMap<&str, Option<&Vehicle>> = BTreeMap::new();
    for vehicle in vehicles {
        let slot = groups.entry(vehicle.direction().label()).or_default();
        *slot = Some(closer(observer, *slot, vehicle));
    }

    groups
        .into_values()
        .flatten()
        .map(|v| RankedVehicle {
            id: v.id().clone(),
            direction: v.direction().clone(),
            position: v.position(),
            distance_m: observer.distance_meters(&v.position()),
        })
        .collect()
}

fn closer<'a>(observer: GeoPoint, a: Option<&'a Vehicle>, b: &'a Vehicle) -> &'a Vehicle {
    match a {
        Some(a) if observer.closer(a.position(), b.position()) == a.position() => a,
        _ => b,
    }
}
