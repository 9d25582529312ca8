//! # marta-live-transit
//!
//! Live route state for a realtime bus map: who is on the route, where they
//! are, and which of them a rider should care about.
//!
//! ## Features
//!
//! - **Registry**: keyed, insertion-ordered tracking of stops and vehicles
//! - **Reconciliation**: merge push or poll vehicle batches without duplicates
//! - **Directional proximity**: nearest and next approaching vehicle per direction
//! - **Pluggable networking**: implement [`TransitFeed`] to supply data
//!
//! ## Example
//!
//! ```
//! use marta_live_transit::prelude::*;
//! use serde_json::json;
//!
//! let reconciler = Reconciler::new(RouteIdentifier::new("110"));
//! let mut vehicles = Registry::new();
//!
//! reconciler.apply_batch(&mut vehicles, &[json!({
//!     "id": "1432",
//!     "route": "110",
//!     "location": [33.7500, -84.3880],
//!     "direction": "SOUTHBOUND",
//!     "status_time": "10/19/2026 04:12:09 PM",
//!     "adherence": 0
//! })]);
//!
//! let rider = GeoPoint::new(33.7490, -84.3880);
//! let report = proximity::rank(rider, vehicles.all());
//! assert_eq!(report.next_for("SOUTHBOUND").unwrap().id.as_str(), "1432");
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod proximity;
pub mod realtime;
pub mod registry;
pub mod spatial;

pub use geo;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{entities::*, traits::*, types::*, wire::*};
    pub use crate::network::traits::*;
    pub use crate::proximity::{self, ProximityReport, RankedVehicle};
    pub use crate::realtime::{BatchReport, ReconcileEvent, Reconciler, VehicleObservation, VehicleStatus};
    pub use crate::registry::{Registry, Upsert};
    pub use crate::spatial::{human_distance, GeoPoint};
}

pub use prelude::*;
