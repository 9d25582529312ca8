use marta_live_transit::models::traits::TrackedEntity;
use marta_live_transit::proximity;
use tracing::debug;

use crate::map::MapSurface;
use crate::presenter::{Presenter, Surface};
use crate::session::{Poi, Selectable, Session};

impl Selectable for Poi {
    fn on_select<P: Presenter, M: MapSurface>(&self, session: &mut Session<P, M>) {
        match self {
            Poi::Stop(id) => {
                let Some(position) = session.stops.get(id).map(|s| s.position()) else {
                    return;
                };
                let controls = session.controls_for(id);
                session.presenter.stop_controls(id, controls);

                let report = proximity::rank(position, session.vehicles.all());
                session
                    .presenter
                    .proximity(&Surface::Detail(self.clone()), &report);
            }
            Poi::Vehicle(id) => {
                let Some(position) = session.vehicles.get(id).map(|v| v.position()) else {
                    return;
                };
                if let Some(observer) = &session.observer {
                    let distance = observer.position.human_distance_to(&position);
                    session.presenter.vehicle_distance(id, &distance);
                }

                debug!(vehicle = %id, "watching vehicle");
                session.watching = Some(id.clone());
                session.map.focus(position, None);
            }
            Poi::Observer => {
                session.refresh_proximity();
            }
        }
    }

    fn on_dismiss<P: Presenter, M: MapSurface>(&self, session: &mut Session<P, M>) {
        if let Poi::Vehicle(id) = self {
            if session.watching.as_ref() == Some(id) {
                session.watching = None;
            }
        }
    }
}
