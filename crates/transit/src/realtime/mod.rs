//! Realtime vehicle observations and their reconciliation.

pub mod observation;
pub mod reconcile;

pub use observation::VehicleObservation;
pub use reconcile::{BatchReport, ReconcileEvent, Reconciler, VehicleStatus};
