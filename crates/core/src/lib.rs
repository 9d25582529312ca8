//! Client runtime for following one route live.
//!
//! The domain model lives in [`transit`]; this crate connects it to the
//! outside world: the HTTP feed, push or poll updates, per-stop schedule
//! timers, geolocation, and the map and presentation seams. A
//! [`session::SessionRunner`] ties them together.

pub mod channel;
pub mod config;
pub mod feed;
pub mod geolocate;
pub mod map;
pub mod presenter;
pub mod schedule;
pub mod session;

// Re-export transit from the transit crate
pub use marta_live_transit as transit;
