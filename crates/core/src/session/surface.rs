use marta_live_transit::identifiers::{StopIdentifier, VehicleIdentifier};

use crate::map::MapSurface;
use crate::presenter::Presenter;
use crate::session::Session;

/// Something on the map that can own the detail view.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Poi {
    Stop(StopIdentifier),
    Vehicle(VehicleIdentifier),
    /// The rider's position. When the observer stands in at a stop this
    /// resolves to that stop.
    Observer,
}

/// Per-variant behavior when a point of interest takes or loses the detail
/// view.
pub trait Selectable {
    fn on_select<P: Presenter, M: MapSurface>(&self, session: &mut Session<P, M>);
    fn on_dismiss<P: Presenter, M: MapSurface>(&self, session: &mut Session<P, M>);
}

/// The single detail view. At most one owner at a time.
#[derive(Debug, Default)]
pub struct DetailSurface {
    owner: Option<Poi>,
}

impl DetailSurface {
    pub fn owner(&self) -> Option<&Poi> {
        self.owner.as_ref()
    }

    pub fn is_owned_by(&self, poi: &Poi) -> bool {
        self.owner.as_ref() == Some(poi)
    }

    /// Hand the view to `poi`, returning the previous owner.
    pub fn swap(&mut self, poi: Poi) -> Option<Poi> {
        std::mem::replace(&mut self.owner, Some(poi))
    }

    pub fn take(&mut self) -> Option<Poi> {
        self.owner.take()
    }
}
