//! Adapter around the external map widget.
//!
//! The widget itself (tiles, markers, polylines) is not ours. [`MapSurface`]
//! is the handful of primitives we need from it, and [`MapView`] layers the
//! two conveniences the session uses on top by composition.

use marta_live_transit::geo::Rect;
use marta_live_transit::spatial::GeoPoint;

use crate::config::DEFAULT_FOCUS_ZOOM;

/// Primitive operations of the external map widget.
pub trait MapSurface {
    fn pan_to(&mut self, point: GeoPoint);
    fn zoom(&self) -> u8;
    fn set_zoom(&mut self, zoom: u8);
    fn fit_bounds(&mut self, bounds: Rect);
    /// Tell the widget its container changed size.
    fn trigger_resize(&mut self);
}

pub struct MapView<M> {
    surface: M,
    focus_zoom: u8,
}

impl<M: MapSurface> MapView<M> {
    pub fn new(surface: M) -> Self {
        Self::with_focus_zoom(surface, DEFAULT_FOCUS_ZOOM)
    }

    pub fn with_focus_zoom(surface: M, focus_zoom: u8) -> Self {
        Self { surface, focus_zoom }
    }

    /// Pan to `point`, zooming in to `zoom` (or the default focus zoom) if
    /// the map is currently further out. Never zooms out.
    pub fn focus(&mut self, point: GeoPoint, zoom: Option<u8>) {
        let zoom = zoom.unwrap_or(self.focus_zoom);
        self.surface.pan_to(point);
        if self.surface.zoom() < zoom {
            self.surface.set_zoom(zoom);
        }
    }

    pub fn resize(&mut self) {
        self.surface.trigger_resize();
    }

    pub fn fit_bounds(&mut self, bounds: Rect) {
        self.surface.fit_bounds(bounds);
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn into_surface(self) -> M {
        self.surface
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeMap;
    use super::*;

    #[test]
    fn test_focus_zooms_in_but_never_out() {
        let point = GeoPoint::new(33.7490, -84.3880);

        let mut view = MapView::new(FakeMap { zoom: 11, ..FakeMap::default() });
        view.focus(point, None);
        assert_eq!(view.surface().center, Some(point));
        assert_eq!(view.surface().zoom, 15);

        let mut view = MapView::new(FakeMap { zoom: 18, ..FakeMap::default() });
        view.focus(point, None);
        assert_eq!(view.surface().zoom, 18);

        view.focus(point, Some(19));
        assert_eq!(view.surface().zoom, 19);
    }

    #[test]
    fn test_resize_delegates() {
        let mut view = MapView::new(FakeMap::default());
        view.resize();
        view.resize();
        assert_eq!(view.into_surface().resizes, 2);
    }
}
