//! Core data types and enums for live route data.

use std::fmt;
use std::sync::Arc;

use crate::spatial::GeoPoint;

// ============================================================================
// Enums
// ============================================================================

/// Direction of travel reported for a vehicle.
///
/// Parsing is case-insensitive. Anything other than the four headings is
/// kept verbatim as `Unrecognized` so it still groups and displays, but it
/// never takes part in "is this vehicle coming toward me" decisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
    Unrecognized(Arc<str>),
}

impl Direction {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "NORTHBOUND" => Self::Northbound,
            "SOUTHBOUND" => Self::Southbound,
            "EASTBOUND" => Self::Eastbound,
            "WESTBOUND" => Self::Westbound,
            _ => Self::Unrecognized(raw.into()),
        }
    }

    /// Label used for grouping and display.
    pub fn label(&self) -> &str {
        match self {
            Self::Northbound => "NORTHBOUND",
            Self::Southbound => "SOUTHBOUND",
            Self::Eastbound => "EASTBOUND",
            Self::Westbound => "WESTBOUND",
            Self::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Whether a vehicle at `vehicle` heading this way is still coming
    /// toward `observer`. Unrecognized directions never approach.
    pub fn approaches(&self, vehicle: GeoPoint, observer: GeoPoint) -> bool {
        match self {
            Self::Northbound => vehicle.lat() < observer.lat(),
            Self::Southbound => vehicle.lat() > observer.lat(),
            Self::Eastbound => vehicle.lng() < observer.lng(),
            Self::Westbound => vehicle.lng() > observer.lng(),
            Self::Unrecognized(_) => false,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a vehicle is running against its timetable, derived from the signed
/// adherence in minutes (negative = behind).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleStatus {
    OnTime,
    Behind(u32),
    Ahead(u32),
}

/// Coarse bucket of a [`ScheduleStatus`], for presentation styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusSeverity {
    OnTime,
    Late,
    Early,
}

impl ScheduleStatus {
    pub fn from_adherence(minutes: i32) -> Self {
        match minutes {
            0 => Self::OnTime,
            m if m < 0 => Self::Behind(m.unsigned_abs()),
            m => Self::Ahead(m.unsigned_abs()),
        }
    }

    pub fn severity(&self) -> StatusSeverity {
        match self {
            Self::OnTime => StatusSeverity::OnTime,
            Self::Behind(_) => StatusSeverity::Late,
            Self::Ahead(_) => StatusSeverity::Early,
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTime => f.write_str("On Time"),
            Self::Behind(n) => write!(f, "{} Minutes Behind Schedule", n),
            Self::Ahead(n) => write!(f, "{} Minutes Ahead of Schedule", n),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Invalid coordinates: ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TransitError {
    fn from(e: serde_json::Error) -> Self {
        TransitError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("NORTHBOUND"), Direction::Northbound);
        assert_eq!(Direction::parse("southbound"), Direction::Southbound);
        assert_eq!(Direction::parse("EastBound"), Direction::Eastbound);

        let loop_dir = Direction::parse("Loop");
        assert!(!loop_dir.is_recognized());
        assert_eq!(loop_dir.label(), "Loop");
    }

    #[test]
    fn test_direction_approaches() {
        let observer = GeoPoint::new(33.7490, -84.3880);
        let north_of = GeoPoint::new(33.7500, -84.3880);
        let west_of = GeoPoint::new(33.7490, -84.3900);

        assert!(Direction::Southbound.approaches(north_of, observer));
        assert!(!Direction::Northbound.approaches(north_of, observer));
        assert!(Direction::Eastbound.approaches(west_of, observer));
        assert!(!Direction::Westbound.approaches(west_of, observer));
        assert!(!Direction::parse("Loop").approaches(north_of, observer));

        // Level with the observer is not "approaching"
        assert!(!Direction::Northbound.approaches(observer, observer));
        assert!(!Direction::Southbound.approaches(observer, observer));
    }

    #[test]
    fn test_schedule_status_text() {
        assert_eq!(ScheduleStatus::from_adherence(0).to_string(), "On Time");
        assert_eq!(
            ScheduleStatus::from_adherence(-4).to_string(),
            "4 Minutes Behind Schedule"
        );
        assert_eq!(
            ScheduleStatus::from_adherence(2).to_string(),
            "2 Minutes Ahead of Schedule"
        );
        assert_eq!(ScheduleStatus::from_adherence(-1).severity(), StatusSeverity::Late);
        assert_eq!(ScheduleStatus::from_adherence(i32::MIN), ScheduleStatus::Behind(2_147_483_648));
    }
}
