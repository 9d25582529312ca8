//! Distance calculations and their rider-facing rendering.
//!
//! Uses the Haversine formula for distances on Earth's surface.

use geo::{HaversineDistance, Point};

pub const FEET_PER_METER: f64 = 3.28084;
pub const FEET_PER_MILE: f64 = 5280.0;

/// Above this many feet a distance is rendered in miles.
const MILES_THRESHOLD_FEET: f64 = 1000.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

/// Render a distance in meters the way riders read it: whole feet up to
/// 1000ft, miles with one decimal beyond that.
pub fn human_distance(meters: f64) -> String {
    let feet = meters * FEET_PER_METER;
    if feet > MILES_THRESHOLD_FEET {
        format!("{:.1}mi", feet / FEET_PER_MILE)
    } else {
        format!("{}ft", feet.round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Atlanta to Savannah is roughly 350 km as the crow flies
        let atlanta = Point::new(-84.3880, 33.7490);
        let savannah = Point::new(-81.0998, 32.0809);

        let dist = haversine_distance(atlanta, savannah);
        assert!((dist - 356_000.0).abs() < 15_000.0);
    }

    #[test]
    fn test_human_distance_feet() {
        assert_eq!(human_distance(999.0 / FEET_PER_METER), "999ft");
        assert_eq!(human_distance(0.0), "0ft");
        assert_eq!(human_distance(500.0 / FEET_PER_METER), "500ft");
    }

    #[test]
    fn test_human_distance_miles() {
        assert_eq!(human_distance(1001.0 / FEET_PER_METER), "0.2mi");
        assert_eq!(human_distance(FEET_PER_MILE * 3.0 / FEET_PER_METER), "3.0mi");
    }
}
