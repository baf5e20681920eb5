//! A stand-in map surface for terminal sessions.
//!
//! Mimics just enough of the real widget's behavior to drive the core:
//! `fit_to_bounds` establishes the viewport, `pan_to` re-centers it while
//! keeping the current span, and markers are numbered in placement order.

use traffic_map_spatial::{LatLng, LatLngBounds};
use traffic_map_view::{MapSurface, MarkerHandle};

/// Simulated map widget backing the demo session.
pub struct SimulatedSurface {
    viewport: Option<LatLngBounds>,
    zoom: u8,
    next_handle: u64,
}

impl Default for SimulatedSurface {
    fn default() -> Self {
        Self {
            viewport: None,
            zoom: 11,
            next_handle: 0,
        }
    }
}

impl MapSurface for SimulatedSurface {
    fn fit_to_bounds(&mut self, bounds: LatLngBounds) {
        log::debug!("map: fit to {bounds:?}");
        self.viewport = Some(bounds);
    }

    fn viewport(&self) -> Option<LatLngBounds> {
        self.viewport
    }

    fn pan_to(&mut self, point: LatLng) {
        log::debug!("map: pan to ({}, {})", point.lat, point.lng);
        if let Some(viewport) = self.viewport {
            let half_lat = (viewport.north_east.lat - viewport.south_west.lat) / 2.0;
            let half_lng = (viewport.north_east.lng - viewport.south_west.lng) / 2.0;
            self.viewport = Some(LatLngBounds::new(
                LatLng::new(point.lat - half_lat, point.lng - half_lng),
                LatLng::new(point.lat + half_lat, point.lng + half_lng),
            ));
        }
    }

    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: u8) {
        log::debug!("map: zoom {} -> {zoom}", self.zoom);
        self.zoom = zoom;
    }

    fn add_marker(&mut self, id: &str, position: LatLng, icon: &'static str) -> MarkerHandle {
        self.next_handle += 1;
        log::debug!(
            "map: marker #{} for {id} at ({}, {}) with {icon}",
            self.next_handle,
            position.lat,
            position.lng
        );
        MarkerHandle::new(self.next_handle)
    }
}
