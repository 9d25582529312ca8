//! Core traits for tracked entities.
//!
//! Anything the map shows and the registry keeps (stops, vehicles) is a
//! tracked entity: it has a stable id, a current position, and a set of
//! mutable attributes refreshed by each observation.

use std::hash::Hash;

use crate::spatial::GeoPoint;

pub trait TrackedEntity {
    type Id: Clone + Eq + Hash;

    /// Everything an observation carries besides id and position.
    type Attrs;

    fn create(id: Self::Id, position: GeoPoint, attrs: Self::Attrs) -> Self;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> GeoPoint;

    fn relocate(&mut self, position: GeoPoint);

    /// Refresh the mutable attributes. Called on every observation, moved or not.
    fn apply(&mut self, attrs: Self::Attrs);
}
