//! JSON shapes served by the route, realtime and upcoming-schedule endpoints.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use geo::{BoundingRect, LineString, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};

use crate::identifiers::*;
use crate::models::entities::{StopAttrs, StopSchedule};
use crate::spatial::GeoPoint;

/// `GET /marta/route/{route}.json`
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RouteDescriptor {
    #[serde(default)]
    pub shapes: Vec<Vec<GeoPoint>>,
    #[serde(default)]
    pub stops: Vec<StopDescriptor>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StopDescriptor {
    pub id: StopIdentifier,
    pub pt: GeoPoint,
    pub name: String,
}

impl StopDescriptor {
    pub fn attrs(&self) -> StopAttrs {
        StopAttrs {
            name: Arc::from(self.name.as_str()),
        }
    }
}

impl RouteDescriptor {
    /// Shapes as line strings (x = longitude, y = latitude).
    pub fn line_strings(&self) -> Vec<LineString> {
        self.shapes
            .iter()
            .map(|shape| shape.iter().map(|p| Point::from(*p)).collect())
            .collect()
    }

    /// Bounding box covering every shape point, if there are any.
    pub fn bounds(&self) -> Option<Rect> {
        let points: MultiPoint = self
            .shapes
            .iter()
            .flatten()
            .map(|p| Point::from(*p))
            .collect();
        points.bounding_rect()
    }
}

/// One entry of `GET /marta/upcoming/{route}.json`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpcomingTimes {
    #[serde(default)]
    pub times: Vec<String>,
    /// Seconds until this stop's schedule should be fetched again.
    pub refresh: u64,
}

impl UpcomingTimes {
    pub fn into_schedule(self) -> StopSchedule {
        let refresh = self.refresh_after();
        StopSchedule {
            times: self.times,
            refresh,
        }
    }

    /// Never less than a second, so a zero refresh cannot spin.
    pub fn refresh_after(&self) -> Duration {
        Duration::from_secs(self.refresh.max(1))
    }
}

pub type UpcomingResponse = HashMap<StopIdentifier, UpcomingTimes>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_descriptor_parse() {
        let json = r#"{
            "name": "110",
            "color": "519817",
            "shapes": [[[33.7490, -84.3880], [33.7600, -84.3870]], [[33.7400, -84.3900]]],
            "stops": [
                {"id": 901229, "pt": [33.7495, -84.3879], "name": "PEACHTREE ST NE @ ELLIS ST"},
                {"id": "901230", "pt": [33.7550, -84.3875], "name": "PEACHTREE ST NE @ 5TH ST"}
            ]
        }"#;

        let route: RouteDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(route.stops.len(), 2);
        assert_eq!(route.stops[0].id.as_str(), "901229");
        assert_eq!(route.line_strings().len(), 2);

        let bounds = route.bounds().unwrap();
        assert_eq!(bounds.min().y, 33.7400);
        assert_eq!(bounds.max().y, 33.7600);
        assert_eq!(bounds.min().x, -84.3900);
        assert_eq!(bounds.max().x, -84.3870);
    }

    #[test]
    fn test_route_without_shapes_has_no_bounds() {
        let route: RouteDescriptor = serde_json::from_str("{}").unwrap();
        assert!(route.bounds().is_none());
    }

    #[test]
    fn test_upcoming_parse() {
        let json = r#"{"901229": {"times": ["4:05 PM", "4:20 PM"], "refresh": 240}}"#;
        let upcoming: UpcomingResponse = serde_json::from_str(json).unwrap();

        let entry = upcoming.get("901229").unwrap();
        assert_eq!(entry.times.len(), 2);
        assert_eq!(entry.refresh_after(), Duration::from_secs(240));
    }

    #[test]
    fn test_zero_refresh_is_clamped() {
        let entry = UpcomingTimes { times: vec![], refresh: 0 };
        assert_eq!(entry.into_schedule().refresh, Duration::from_secs(1));
    }

    #[test]
    fn test_into_schedule_keeps_times_and_refresh() {
        let entry = UpcomingTimes {
            times: vec!["4:05 PM".into(), "4:20 PM".into()],
            refresh: 240,
        };
        let schedule = entry.into_schedule();
        assert_eq!(schedule.times, vec!["4:05 PM", "4:20 PM"]);
        assert_eq!(schedule.refresh, Duration::from_secs(240));
    }
}
