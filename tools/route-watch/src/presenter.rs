use marta_live_core::presenter::{Failure, Presenter, StopControls, Surface};
use marta_live_core::session::Poi;
use marta_live_core::transit::identifiers::{StopIdentifier, VehicleIdentifier};
use marta_live_core::transit::models::entities::Stop;
use marta_live_core::transit::models::traits::TrackedEntity;
use marta_live_core::transit::models::types::StatusSeverity;
use marta_live_core::transit::proximity::ProximityReport;
use marta_live_core::transit::realtime::VehicleStatus;
use tracing::{debug, error, info, warn};

/// Writes what a rider would see to the log.
#[derive(Debug, Default)]
pub struct LogPresenter;

fn describe(surface: &Surface) -> String {
    match surface {
        Surface::Global => "you".to_owned(),
        Surface::Detail(Poi::Observer) => "your position".to_owned(),
        Surface::Detail(Poi::Stop(id)) => format!("stop {id}"),
        Surface::Detail(Poi::Vehicle(id)) => format!("bus {id}"),
    }
}

impl Presenter for LogPresenter {
    fn proximity(&mut self, surface: &Surface, report: &ProximityReport) {
        let target = describe(surface);
        if report.next.is_empty() {
            info!("{target}: no buses approaching");
        }
        for ranked in &report.next {
            info!(
                "{target}: next {} bus is {} ({} away)",
                ranked.direction,
                ranked.id,
                ranked.human_distance()
            );
        }
        for ranked in &report.near {
            debug!(
                "{target}: nearest {} bus is {} ({} away)",
                ranked.direction,
                ranked.id,
                ranked.human_distance()
            );
        }
    }

    fn clear_global(&mut self) {
        debug!("status bar cleared");
    }

    fn vehicle_status(&mut self, status: &VehicleStatus, distance: Option<&str>) {
        let away = distance.map(|d| format!(", {d} away")).unwrap_or_default();
        match status.schedule.severity() {
            StatusSeverity::Late => warn!(
                "bus {} ({}): {} as of {}{away}",
                status.id, status.direction, status.schedule, status.status_time
            ),
            StatusSeverity::OnTime | StatusSeverity::Early => debug!(
                "bus {} ({}): {} as of {}{away}",
                status.id, status.direction, status.schedule, status.status_time
            ),
        }
    }

    fn vehicle_distance(&mut self, vehicle: &VehicleIdentifier, distance: &str) {
        info!("bus {vehicle} is {distance} away");
    }

    fn stop_schedule(&mut self, stop: &Stop) {
        let times = stop
            .schedule()
            .map(|s| s.times.join(", "))
            .unwrap_or_default();
        if times.is_empty() {
            info!("stop {} ({}): no upcoming times", stop.id(), stop.name());
        } else {
            info!("stop {} ({}): {times}", stop.id(), stop.name());
        }
    }

    fn stop_controls(&mut self, stop: &StopIdentifier, controls: StopControls) {
        if controls == StopControls::CurrentPosition {
            info!("stop {stop} is now your position");
        }
    }

    fn stops_visible(&mut self, visible: bool) {
        debug!(visible, "stops toggled");
    }

    fn detail_opened(&mut self, owner: &Poi) {
        debug!(?owner, "detail opened");
    }

    fn detail_closed(&mut self, owner: &Poi) {
        debug!(?owner, "detail closed");
    }

    fn geolocation_notice(&mut self, show: bool) {
        if show {
            warn!("could not determine your position; pass --lat/--lng or --stop");
        }
    }

    fn failure(&mut self, failure: &Failure) {
        error!("{failure}");
    }
}
