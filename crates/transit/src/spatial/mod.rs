//! Coordinates and distance utilities.

pub mod point;
pub mod queries;

pub use point::{GeoPoint, PRACTICAL_EQUALITY_METERS};
pub use queries::{haversine_distance, human_distance};
