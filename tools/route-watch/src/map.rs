use marta_live_core::map::MapSurface;
use marta_live_core::transit::geo::Rect;
use marta_live_core::transit::spatial::GeoPoint;
use tracing::debug;

const INITIAL_ZOOM: u8 = 11;

/// Map with no screen behind it. Keeps track of where it would be looking.
#[derive(Debug)]
pub struct HeadlessMap {
    center: Option<GeoPoint>,
    zoom: u8,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self {
            center: None,
            zoom: INITIAL_ZOOM,
        }
    }
}

impl MapSurface for HeadlessMap {
    fn pan_to(&mut self, point: GeoPoint) {
        debug!(lat = point.lat(), lng = point.lng(), "map centered");
        self.center = Some(point);
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: u8) {
        debug!(zoom, "map zoomed");
        self.zoom = zoom;
    }

    fn fit_bounds(&mut self, bounds: Rect) {
        let center = bounds.center();
        debug!(
            min_lat = bounds.min().y,
            min_lng = bounds.min().x,
            max_lat = bounds.max().y,
            max_lng = bounds.max().x,
            "map fitted to route"
        );
        self.center = Some(GeoPoint::new(center.y, center.x));
    }

    fn trigger_resize(&mut self) {}
}
