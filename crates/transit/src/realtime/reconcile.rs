//! Merges realtime vehicle batches into the vehicle registry.
//!
//! Push messages and poll responses go through the same path. Records are
//! independent: a malformed record is skipped and the rest of the batch is
//! still applied. A vehicle is only ever removed by an observation for a
//! different route or by an explicit staleness notice, never for being
//! absent from a batch.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::identifiers::*;
use crate::models::entities::Vehicle;
use crate::models::traits::TrackedEntity;
use crate::models::types::*;
use crate::realtime::observation::VehicleObservation;
use crate::registry::{Registry, Upsert};
use crate::spatial::GeoPoint;

/// What happened to a vehicle while applying a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileEvent {
    Created(VehicleIdentifier),
    Moved {
        id: VehicleIdentifier,
        from: GeoPoint,
        to: GeoPoint,
    },
    /// Attributes refreshed without a position change.
    Refreshed(VehicleIdentifier),
    /// Observed on another route; dropped from tracking.
    LeftRoute(VehicleIdentifier),
    /// Named in a staleness notice; dropped from tracking.
    Evicted(VehicleIdentifier),
    Skipped { index: usize, reason: String },
}

/// Presentation data for one accepted observation. Not stored anywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleStatus {
    pub id: VehicleIdentifier,
    pub direction: Direction,
    pub status_time: Arc<str>,
    pub schedule: ScheduleStatus,
    pub position: GeoPoint,
}

#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub events: Vec<ReconcileEvent>,
    pub statuses: Vec<VehicleStatus>,
}

impl BatchReport {
    pub fn moved(&self) -> impl Iterator<Item = &VehicleIdentifier> + '_ {
        self.events.iter().filter_map(|e| match e {
            ReconcileEvent::Moved { id, .. } => Some(id),
            _ => None,
        })
    }

    /// Vehicles that are no longer tracked after this batch.
    pub fn removed(&self) -> impl Iterator<Item = &VehicleIdentifier> + '_ {
        self.events.iter().filter_map(|e| match e {
            ReconcileEvent::LeftRoute(id) | ReconcileEvent::Evicted(id) => Some(id),
            _ => None,
        })
    }

    pub fn skipped(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ReconcileEvent::Skipped { .. }))
            .count()
    }
}

/// Applies observations for a single route of interest.
#[derive(Clone, Debug)]
pub struct Reconciler {
    route: RouteIdentifier,
}

impl Reconciler {
    pub fn new(route: RouteIdentifier) -> Self {
        Self { route }
    }

    pub fn route(&self) -> &RouteIdentifier {
        &self.route
    }

    /// Apply a raw batch, decoding each record on its own.
    pub fn apply_batch(
        &self,
        registry: &mut Registry<Vehicle>,
        batch: &[serde_json::Value],
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for (index, value) in batch.iter().enumerate() {
            match VehicleObservation::from_value(value) {
                Ok(observation) => self.apply(registry, observation, &mut report),
                Err(e) => {
                    warn!("skipping realtime record {index}: {e}");
                    report.events.push(ReconcileEvent::Skipped {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            route = %self.route,
            records = batch.len(),
            statuses = report.statuses.len(),
            skipped = report.skipped(),
            tracked = registry.len(),
            "applied vehicle batch"
        );
        report
    }

    fn apply(
        &self,
        registry: &mut Registry<Vehicle>,
        observation: VehicleObservation,
        report: &mut BatchReport,
    ) {
        let id = observation.id.clone();

        if observation.route != self.route {
            if registry.remove(&id).is_some() {
                debug!(vehicle = %id, route = %observation.route, "vehicle left route");
                report.events.push(ReconcileEvent::LeftRoute(id));
            }
            return;
        }

        let previous = registry.get(&id).map(|v| v.position());
        let attrs = observation.attrs();
        let status = VehicleStatus {
            id: id.clone(),
            direction: attrs.direction.clone(),
            status_time: attrs.status_time.clone(),
            schedule: ScheduleStatus::from_adherence(attrs.adherence),
            position: observation.location,
        };

        let event = match registry.upsert(id.clone(), observation.location, attrs) {
            Upsert::Created => {
                debug!(vehicle = %id, "tracking new vehicle");
                ReconcileEvent::Created(id)
            }
            Upsert::Updated { moved: true } => ReconcileEvent::Moved {
                id,
                from: previous.unwrap_or(observation.location),
                to: observation.location,
            },
            Upsert::Updated { moved: false } => ReconcileEvent::Refreshed(id),
        };

        report.events.push(event);
        report.statuses.push(status);
    }

    /// Force-remove vehicles named by a staleness notice, regardless of route.
    pub fn evict_stale(
        &self,
        registry: &mut Registry<Vehicle>,
        ids: impl IntoIterator<Item = VehicleIdentifier>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for id in ids {
            if registry.remove(&id).is_some() {
                debug!(vehicle = %id, "evicted stale vehicle");
                report.events.push(ReconcileEvent::Evicted(id));
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn bus(id: &str, route: &str, lat: f64, lng: f64, direction: &str, adherence: i32) -> Value {
        json!({
            "id": id,
            "route": route,
            "location": [lat, lng],
            "direction": direction,
            "status_time": "10/19/2026 04:12:09 PM",
            "adherence": adherence
        })
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(RouteIdentifier::new("110"))
    }

    #[test]
    fn test_create_move_refresh() {
        let reconciler = reconciler();
        let mut registry = Registry::new();

        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("1432", "110", 33.7490, -84.3880, "NORTHBOUND", 0)],
        );
        assert_eq!(report.events, vec![ReconcileEvent::Created("1432".into())]);

        // Same position, new adherence: refreshed without moving
        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("1432", "110", 33.7490, -84.3880, "NORTHBOUND", -5)],
        );
        assert_eq!(report.events, vec![ReconcileEvent::Refreshed("1432".into())]);
        assert_eq!(report.statuses[0].schedule, ScheduleStatus::Behind(5));
        assert_eq!(registry.get(&"1432".into()).unwrap().adherence(), -5);

        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("1432", "110", 33.7500, -84.3880, "NORTHBOUND", -5)],
        );
        assert_eq!(
            report.events,
            vec![ReconcileEvent::Moved {
                id: "1432".into(),
                from: GeoPoint::new(33.7490, -84.3880),
                to: GeoPoint::new(33.7500, -84.3880),
            }]
        );
        assert_eq!(report.moved().count(), 1);
    }

    #[test]
    fn test_tiny_moves_still_count() {
        // Movement uses exact equality, not the 1m tolerance
        let reconciler = reconciler();
        let mut registry = Registry::new();
        reconciler.apply_batch(&mut registry, &[bus("1", "110", 33.7490, -84.3880, "EASTBOUND", 0)]);
        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("1", "110", 33.7490001, -84.3880, "EASTBOUND", 0)],
        );
        assert_eq!(report.moved().count(), 1);
    }

    #[test]
    fn test_same_observation_twice() {
        let reconciler = reconciler();
        let mut registry = Registry::new();
        let record = bus("1432", "110", 33.7490, -84.3880, "SOUTHBOUND", 2);

        reconciler.apply_batch(&mut registry, &[record.clone()]);
        let before = registry.get(&"1432".into()).unwrap().clone();
        reconciler.apply_batch(&mut registry, &[record]);
        let after = registry.get(&"1432".into()).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(before.position(), after.position());
        assert_eq!(before.direction(), after.direction());
        assert_eq!(before.adherence(), after.adherence());
        assert_eq!(before.status_time(), after.status_time());
        assert!(after.last_update() >= before.last_update());
    }

    #[test]
    fn test_route_mismatch_removes_tracked_vehicle() {
        let reconciler = reconciler();
        let mut registry = Registry::new();
        reconciler.apply_batch(&mut registry, &[bus("1432", "110", 33.7490, -84.3880, "NORTHBOUND", 0)]);

        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("1432", "36", 33.7490, -84.3880, "NORTHBOUND", 0)],
        );
        assert_eq!(report.events, vec![ReconcileEvent::LeftRoute("1432".into())]);
        assert!(report.statuses.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_route_mismatch_for_unknown_vehicle_is_noop() {
        let reconciler = reconciler();
        let mut registry = Registry::new();

        let report = reconciler.apply_batch(
            &mut registry,
            &[bus("9999", "36", 33.7490, -84.3880, "NORTHBOUND", 0)],
        );
        assert!(report.events.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_record_does_not_abort_batch() {
        let reconciler = reconciler();
        let mut registry = Registry::new();

        let report = reconciler.apply_batch(
            &mut registry,
            &[
                bus("1", "110", 33.7490, -84.3880, "NORTHBOUND", 0),
                json!({"id": "2", "route": "110", "location": null, "direction": "NORTHBOUND"}),
                json!(42),
                bus("3", "110", 33.7500, -84.3880, "SOUTHBOUND", 1),
            ],
        );

        assert_eq!(report.skipped(), 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&"1".into()));
        assert!(registry.contains(&"3".into()));
        assert!(matches!(report.events[1], ReconcileEvent::Skipped { index: 1, .. }));
    }

    #[test]
    fn test_unknown_direction_stays_tracked() {
        let reconciler = reconciler();
        let mut registry = Registry::new();
        reconciler.apply_batch(&mut registry, &[bus("1", "110", 33.7490, -84.3880, "LOOP", 0)]);

        let vehicle = registry.get(&"1".into()).unwrap();
        assert!(!vehicle.direction().is_recognized());
    }

    #[test]
    fn test_stale_eviction_bypasses_route_check() {
        let reconciler = reconciler();
        let mut registry = Registry::new();
        reconciler.apply_batch(
            &mut registry,
            &[
                bus("1", "110", 33.7490, -84.3880, "NORTHBOUND", 0),
                bus("2", "110", 33.7500, -84.3880, "NORTHBOUND", 0),
            ],
        );

        let report = reconciler.evict_stale(&mut registry, vec!["1".into(), "unknown".into()]);
        assert_eq!(report.events, vec![ReconcileEvent::Evicted("1".into())]);
        assert_eq!(report.removed().count(), 1);
        assert!(!registry.contains(&"1".into()));
        assert!(registry.contains(&"2".into()));

        // Evicting again is a no-op
        let report = reconciler.evict_stale(&mut registry, vec!["1".into()]);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_absent_vehicles_are_not_evicted() {
        let reconciler = reconciler();
        let mut registry = Registry::new();
        reconciler.apply_batch(
            &mut registry,
            &[
                bus("1", "110", 33.7490, -84.3880, "NORTHBOUND", 0),
                bus("2", "110", 33.7500, -84.3880, "NORTHBOUND", 0),
            ],
        );

        // A later full batch without "2" leaves it in place
        let report = reconciler.apply_batch(&mut registry, &[bus("1", "110", 33.7491, -84.3880, "NORTHBOUND", 0)]);
        assert_eq!(report.removed().count(), 0);
        assert!(registry.contains(&"2".into()));
    }
}
