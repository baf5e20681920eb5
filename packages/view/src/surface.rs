//! The seam to the external map widget.
//!
//! [`MapSurface`] models the collaborator's surface: viewport reporting,
//! pan/zoom, and marker placement. [`MapAdapter`] wraps a surface and owns
//! the id → [`MarkerHandle`] side registry, so rendering-handle lifecycle
//! never leaks onto the immutable incident records.

use std::collections::BTreeMap;

use traffic_map_spatial::{LatLng, LatLngBounds};
use traffic_map_store::IncidentStore;

/// Minimum zoom applied when the map is asked to focus on an incident.
/// Focusing never lowers an already-closer view.
pub const FOCUS_ZOOM: u8 = 13;

/// Opaque handle to a marker placed on the external map widget.
///
/// Only meaningful to the surface that issued it; the rest of the system
/// treats it as an anchor token for the detail popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    /// Wraps a surface-issued raw handle value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The external map widget.
///
/// The widget owns the viewport and all rendering; this trait only
/// transcribes the calls the core needs to make. `viewport()` returns
/// `None` until the widget has finished initializing.
pub trait MapSurface {
    /// Frames the view so the given bounds are fully visible.
    fn fit_to_bounds(&mut self, bounds: LatLngBounds);

    /// The current viewport, once the widget has one.
    fn viewport(&self) -> Option<LatLngBounds>;

    /// Re-centers the view on a point.
    fn pan_to(&mut self, point: LatLng);

    /// Current zoom level.
    fn zoom(&self) -> u8;

    /// Sets the zoom level.
    fn set_zoom(&mut self, zoom: u8);

    /// Places a marker and returns its handle.
    fn add_marker(&mut self, id: &str, position: LatLng, icon: &'static str) -> MarkerHandle;
}

/// Wraps a [`MapSurface`] with the incident-facing operations the core
/// needs: marker placement with handle bookkeeping, initial framing, and
/// focus with the raise-only zoom rule.
pub struct MapAdapter<S: MapSurface> {
    surface: S,
    /// incident id -> marker handle placed for it.
    markers: BTreeMap<String, MarkerHandle>,
}

impl<S: MapSurface> MapAdapter<S> {
    /// Wraps a surface with an empty marker registry.
    #[must_use]
    pub const fn new(surface: S) -> Self {
        Self {
            surface,
            markers: BTreeMap::new(),
        }
    }

    /// Places one marker per positioned incident and records the handles.
    ///
    /// Position-less incidents get no marker; they are already excluded
    /// from every geographic operation.
    pub fn sync_markers(&mut self, store: &IncidentStore) {
        for incident in store {
            if let Some(position) = incident.position {
                let handle =
                    self.surface
                        .add_marker(&incident.id, position, incident.alert_type.icon());
                self.markers.insert(incident.id.clone(), handle);
            }
        }
        log::info!("Placed {} incident markers", self.markers.len());
    }

    /// Looks up the marker handle anchoring an incident's detail popup.
    #[must_use]
    pub fn marker_for(&self, id: &str) -> Option<MarkerHandle> {
        self.markers.get(id).copied()
    }

    /// Frames the whole dataset on initial load. No-op when no incident
    /// has a position.
    pub fn fit_all(&mut self, store: &IncidentStore) {
        if let Some(bounds) =
            LatLngBounds::from_points(store.iter().filter_map(|incident| incident.position))
        {
            self.surface.fit_to_bounds(bounds);
        }
    }

    /// Re-centers on a position and raises zoom to [`FOCUS_ZOOM`] if the
    /// view is currently further out. Never decreases zoom.
    pub fn focus(&mut self, position: LatLng) {
        self.surface.pan_to(position);
        if self.surface.zoom() < FOCUS_ZOOM {
            self.surface.set_zoom(FOCUS_ZOOM);
        }
    }

    /// The surface's current viewport, if initialized.
    #[must_use]
    pub fn viewport(&self) -> Option<LatLngBounds> {
        self.surface.viewport()
    }

    /// Read access to the wrapped surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }
}
