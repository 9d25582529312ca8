//! Keyed collection of live entities.
//!
//! The registry owns identity and position state. Iteration follows first
//! insertion order, which is the "encounter order" proximity ranking relies
//! on when two candidates cannot be told apart.

use std::collections::HashMap;

use crate::identifiers::StopIdentifier;
use crate::models::entities::{Stop, StopSchedule};
use crate::models::traits::TrackedEntity;
use crate::spatial::GeoPoint;

/// Outcome of [`Registry::upsert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Created,
    /// `moved` is decided by exact coordinate equality.
    Updated { moved: bool },
}

pub struct Registry<E: TrackedEntity> {
    entries: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E: TrackedEntity> Registry<E> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.entries.get(id)
    }

    /// Insert a new entity or refresh an existing one in place.
    pub fn upsert(&mut self, id: E::Id, position: GeoPoint, attrs: E::Attrs) -> Upsert {
        if let Some(entity) = self.entries.get_mut(&id) {
            entity.apply(attrs);
            let moved = entity.position() != position;
            if moved {
                entity.relocate(position);
            }
            return Upsert::Updated { moved };
        }

        self.order.push(id.clone());
        self.entries.insert(id.clone(), E::create(id, position, attrs));
        Upsert::Created
    }

    /// Remove an entity. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &E::Id) -> Option<E> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|known| known != id);
        Some(removed)
    }

    /// All entities in first-insertion order.
    pub fn all(&self) -> impl Iterator<Item = &E> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}

impl<E: TrackedEntity> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry<Stop> {
    /// Attach a freshly fetched schedule. Returns `false` for unknown stops.
    pub fn attach_schedule(&mut self, id: &StopIdentifier, schedule: StopSchedule) -> bool {
        match self.entries.get_mut(id) {
            Some(stop) => {
                stop.set_schedule(schedule);
                true
            }
            None => false,
        }
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for stop in self.entries.values_mut() {
            stop.set_visible(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::identifiers::VehicleIdentifier;
    use crate::models::entities::{StopAttrs, Vehicle, VehicleAttrs};
    use crate::models::types::Direction;

    fn attrs(direction: Direction, adherence: i32) -> VehicleAttrs {
        VehicleAttrs {
            direction,
            adherence,
            status_time: "10/19/2026 04:12:09 PM".into(),
        }
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut registry: Registry<Vehicle> = Registry::new();
        let id = VehicleIdentifier::new("1432");
        let here = GeoPoint::new(33.7490, -84.3880);
        let there = GeoPoint::new(33.7500, -84.3880);

        assert_eq!(
            registry.upsert(id.clone(), here, attrs(Direction::Northbound, 0)),
            Upsert::Created
        );
        assert_eq!(
            registry.upsert(id.clone(), here, attrs(Direction::Northbound, -2)),
            Upsert::Updated { moved: false }
        );
        assert_eq!(
            registry.upsert(id.clone(), there, attrs(Direction::Northbound, -2)),
            Upsert::Updated { moved: true }
        );

        assert_eq!(registry.len(), 1);
        let vehicle = registry.get(&id).unwrap();
        assert_eq!(vehicle.position(), there);
        assert_eq!(vehicle.adherence(), -2);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut once: Registry<Vehicle> = Registry::new();
        let mut twice: Registry<Vehicle> = Registry::new();
        let id = VehicleIdentifier::new("1432");
        let here = GeoPoint::new(33.7490, -84.3880);

        once.upsert(id.clone(), here, attrs(Direction::Westbound, 3));
        twice.upsert(id.clone(), here, attrs(Direction::Westbound, 3));
        twice.upsert(id.clone(), here, attrs(Direction::Westbound, 3));

        let a = once.get(&id).unwrap();
        let b = twice.get(&id).unwrap();
        assert_eq!(once.len(), twice.len());
        assert_eq!(a.position(), b.position());
        assert_eq!(a.direction(), b.direction());
        assert_eq!(a.adherence(), b.adherence());
        assert_eq!(a.status_time(), b.status_time());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry: Registry<Vehicle> = Registry::new();
        let id = VehicleIdentifier::new("1432");
        registry.upsert(id.clone(), GeoPoint::new(33.7, -84.3), attrs(Direction::Eastbound, 0));

        assert!(registry.remove(&id).is_some());
        assert!(registry.remove(&id).is_none());
        assert!(registry.remove(&VehicleIdentifier::new("never-seen")).is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.all().count(), 0);
    }

    #[test]
    fn test_iteration_follows_first_insertion() {
        let mut registry: Registry<Vehicle> = Registry::new();
        for id in ["c", "a", "b"] {
            registry.upsert(id.into(), GeoPoint::new(33.7, -84.3), attrs(Direction::Eastbound, 0));
        }
        // Updating does not reorder
        registry.upsert("c".into(), GeoPoint::new(33.8, -84.3), attrs(Direction::Eastbound, 0));
        registry.remove(&"a".into());
        registry.upsert("a".into(), GeoPoint::new(33.7, -84.3), attrs(Direction::Eastbound, 0));

        let order: Vec<&str> = registry.all().map(|v| v.id().as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_stop_schedule_and_visibility() {
        let mut stops: Registry<Stop> = Registry::new();
        let id = StopIdentifier::new("901229");
        stops.upsert(
            id.clone(),
            GeoPoint::new(33.7495, -84.3879),
            StopAttrs { name: Arc::from("PEACHTREE ST NE @ ELLIS ST") },
        );

        let schedule = StopSchedule {
            times: vec!["4:05 PM".to_owned()],
            refresh: Duration::from_secs(60),
        };
        assert!(stops.attach_schedule(&id, schedule.clone()));
        assert!(!stops.attach_schedule(&StopIdentifier::new("gone"), schedule.clone()));
        assert_eq!(stops.get(&id).unwrap().schedule(), Some(&schedule));

        assert!(!stops.get(&id).unwrap().is_visible());
        stops.set_all_visible(true);
        assert!(stops.get(&id).unwrap().is_visible());
    }
}
