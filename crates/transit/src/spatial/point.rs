//! Geographic coordinate shared by every tracked entity.

use geo::Point;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::types::{Result, TransitError};
use crate::spatial::queries::{haversine_distance, human_distance};

/// Points closer than this many meters are "practically equal".
pub const PRACTICAL_EQUALITY_METERS: f64 = 1.0;

/// Latitude/longitude pair in degrees.
///
/// `PartialEq` is exact coordinate equality; use [`GeoPoint::equals`] with
/// `exact = false` for the one meter tolerance.
///
/// On the wire a point is a `[lat, lng]` pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Like [`GeoPoint::new`] but rejects non-finite or out-of-range input.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
            return Err(TransitError::InvalidCoordinates { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance in meters.
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        haversine_distance((*self).into(), (*other).into())
    }

    /// Distance rendered for riders, e.g. `"640ft"` or `"1.4mi"`.
    pub fn human_distance_to(&self, other: &GeoPoint) -> String {
        human_distance(self.distance_meters(other))
    }

    pub fn equals(&self, other: &GeoPoint, exact: bool) -> bool {
        if exact {
            self == other
        } else {
            self.distance_meters(other) < PRACTICAL_EQUALITY_METERS
        }
    }

    /// Returns whichever of `a` or `b` is closer to this point. `b` wins
    /// unless `a` is strictly closer.
    pub fn closer(&self, a: GeoPoint, b: GeoPoint) -> GeoPoint {
        if self.distance_meters(&a) < self.distance_meters(&b) {
            a
        } else {
            b
        }
    }
}

impl From<GeoPoint> for Point {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl From<Point> for GeoPoint {
    fn from(p: Point) -> Self {
        GeoPoint::new(p.y(), p.x())
    }
}

impl From<[f64; 2]> for GeoPoint {
    /// `[lat, lng]`, the order the realtime endpoints use.
    fn from(pair: [f64; 2]) -> Self {
        GeoPoint::new(pair[0], pair[1])
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        [self.lat, self.lng].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let [lat, lng] = <[f64; 2]>::deserialize(deserializer)?;
        GeoPoint::try_new(lat, lng).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FIVE_POINTS: GeoPoint = GeoPoint::new(33.7540, -84.3915);
    const PEACHTREE_CENTER: GeoPoint = GeoPoint::new(33.7596, -84.3877);

    #[test]
    fn test_distance_is_symmetric() {
        let points = [
            FIVE_POINTS,
            PEACHTREE_CENTER,
            GeoPoint::new(33.7490, -84.3880),
            GeoPoint::new(-33.8688, 151.2093),
            GeoPoint::new(0.0, 179.9),
            GeoPoint::new(0.0, -179.9),
        ];

        for a in &points {
            for b in &points {
                assert_relative_eq!(a.distance_meters(b), b.distance_meters(a));
            }
        }
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_relative_eq!(FIVE_POINTS.distance_meters(&FIVE_POINTS), 0.0);
        assert!(FIVE_POINTS.equals(&FIVE_POINTS, true));
        assert!(FIVE_POINTS.equals(&FIVE_POINTS, false));
    }

    #[test]
    fn test_practical_equality_threshold() {
        // One degree of latitude is ~111.2 km, so these offsets straddle 1m
        let base = GeoPoint::new(33.7490, -84.3880);
        let half_meter = GeoPoint::new(33.7490 + 0.5 / 111_195.0, -84.3880);
        let two_meters = GeoPoint::new(33.7490 + 2.0 / 111_195.0, -84.3880);

        assert!(base.distance_meters(&half_meter) < 1.0);
        assert!(base.equals(&half_meter, false));
        assert!(!base.equals(&half_meter, true));

        assert!(base.distance_meters(&two_meters) >= 1.0);
        assert!(!base.equals(&two_meters, false));
    }

    #[test]
    fn test_closer_picks_strictly_nearer() {
        let observer = GeoPoint::new(33.7490, -84.3880);
        let north = GeoPoint::new(33.7500, -84.3880);
        let far = GeoPoint::new(33.7600, -84.3880);

        assert_eq!(observer.closer(north, far), north);
        assert_eq!(observer.closer(far, north), north);
    }

    #[test]
    fn test_closer_exact_tie_takes_b() {
        // Mirrored across the equator, so both distances are bit-identical
        let origin = GeoPoint::new(0.0, 0.0);
        let north = GeoPoint::new(0.001, 0.0);
        let south = GeoPoint::new(-0.001, 0.0);
        assert_eq!(origin.distance_meters(&north), origin.distance_meters(&south));

        assert_eq!(origin.closer(north, south), south);
        assert_eq!(origin.closer(south, north), north);
    }

    #[test]
    fn test_wire_order_is_lat_lng() {
        let point: GeoPoint = serde_json::from_str("[33.749, -84.388]").unwrap();
        assert_eq!(point.lat(), 33.749);
        assert_eq!(point.lng(), -84.388);

        let geo_point: Point = point.into();
        assert_eq!(geo_point.x(), -84.388);
        assert_eq!(geo_point.y(), 33.749);

        assert_eq!(serde_json::to_string(&point).unwrap(), "[33.749,-84.388]");
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        assert!(GeoPoint::try_new(91.0, 0.0).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(serde_json::from_str::<GeoPoint>("[33.7, 200.0]").is_err());
        assert!(serde_json::from_str::<GeoPoint>("[33.7]").is_err());
    }
}
