#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Viewport-synchronized incident visibility.
//!
//! [`compute_visible`] is the pure filtering contract: the store-order
//! subsequence of incidents whose position lies inside a region.
//! [`ViewportFilter`] wraps it reactively — it tracks the last settled
//! viewport reported by the map widget and republishes the visible set to
//! its subscribers after each recompute.
//!
//! The filter is driven once per settled gesture (the map widget's "idle"
//! notification), never per animation frame.

use std::rc::Rc;

use traffic_map_spatial::{LatLngBounds, Region};
use traffic_map_store::{Incident, IncidentStore};

/// Computes the visible subset of the store for the given region.
///
/// Returns store indices in dataset order. Containment is whatever the
/// region predicate reports; incidents without a position are never
/// visible.
#[must_use]
pub fn compute_visible(store: &IncidentStore, region: &impl Region) -> Vec<usize> {
    store
        .iter()
        .enumerate()
        .filter(|(_, incident)| incident.position.is_some_and(|p| region.contains(p)))
        .map(|(idx, _)| idx)
        .collect()
}

type VisibleListener = Box<dyn FnMut(&[usize])>;

/// Reactive holder of the current viewport and visible set.
///
/// Subscribers are notified with the new visible indices after every
/// completed recompute. A recompute requested before the map has reported
/// any viewport is skipped and the previous visible set is retained.
pub struct ViewportFilter {
    store: Rc<IncidentStore>,
    viewport: Option<LatLngBounds>,
    visible: Vec<usize>,
    listeners: Vec<VisibleListener>,
}

impl ViewportFilter {
    /// Creates a filter over the given store with no viewport yet.
    #[must_use]
    pub fn new(store: Rc<IncidentStore>) -> Self {
        Self {
            store,
            viewport: None,
            visible: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for visible-set changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&[usize]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Handles the map widget's settled notification at the end of a
    /// pan/zoom gesture.
    pub fn viewport_settled(&mut self, bounds: LatLngBounds) {
        self.viewport = Some(bounds);
        self.recompute();
    }

    /// Recomputes the visible set against the current viewport.
    ///
    /// Skipped silently when no viewport has settled yet (e.g. the map is
    /// still initializing); the previous visible set is retained.
    pub fn recompute(&mut self) {
        let Some(viewport) = self.viewport else {
            log::debug!("visible-set recompute skipped: no viewport yet");
            return;
        };

        self.visible = compute_visible(&self.store, &viewport);
        for listener in &mut self.listeners {
            listener(&self.visible);
        }
    }

    /// The last settled viewport, if any.
    #[must_use]
    pub const fn viewport(&self) -> Option<LatLngBounds> {
        self.viewport
    }

    /// Store indices of the currently visible incidents, in dataset order.
    #[must_use]
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Iterates the currently visible incidents in dataset order.
    pub fn visible(&self) -> impl Iterator<Item = &Incident> {
        self.visible.iter().filter_map(|&idx| self.store.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use traffic_map_spatial::LatLng;
    use traffic_map_store::RawIncident;

    use super::*;

    fn raw(id: &str, lat: &str, long: &str) -> RawIncident {
        RawIncident {
            id: id.to_string(),
            alert_type: "roadworks".to_string(),
            title: format!("Incident {id}"),
            description: "test".to_string(),
            lat: lat.to_string(),
            long: long.to_string(),
        }
    }

    /// Three incidents at distinct coordinates, roughly a north-south line.
    fn three_incident_store() -> Rc<IncidentStore> {
        Rc::new(
            IncidentStore::from_raw(vec![
                raw("north", "-36.5", "174.7"),
                raw("middle", "-36.9", "174.7"),
                raw("south", "-37.3", "174.7"),
            ])
            .unwrap(),
        )
    }

    /// Bounds covering only the two northern incidents.
    fn northern_bounds() -> LatLngBounds {
        LatLngBounds::new(LatLng::new(-37.0, 174.0), LatLng::new(-36.0, 175.0))
    }

    /// Bounds covering all three incidents.
    fn wide_bounds() -> LatLngBounds {
        LatLngBounds::new(LatLng::new(-38.0, 174.0), LatLng::new(-36.0, 175.0))
    }

    #[test]
    fn membership_matches_containment() {
        let store = three_incident_store();
        let bounds = northern_bounds();
        let visible = compute_visible(&store, &bounds);

        for (idx, incident) in store.iter().enumerate() {
            let inside = incident.position.is_some_and(|p| bounds.contains(p));
            assert_eq!(
                visible.contains(&idx),
                inside,
                "incident {} containment/visibility mismatch",
                incident.id
            );
        }
    }

    #[test]
    fn preserves_store_order() {
        let store = three_incident_store();
        let visible = compute_visible(&store, &northern_bounds());
        assert_eq!(visible, vec![0, 1]);

        let all = compute_visible(&store, &wide_bounds());
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn panning_grows_visible_set_in_order() {
        let store = three_incident_store();
        let mut filter = ViewportFilter::new(Rc::clone(&store));

        filter.viewport_settled(northern_bounds());
        let ids: Vec<&str> = filter.visible().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["north", "middle"]);

        filter.viewport_settled(wide_bounds());
        let ids: Vec<&str> = filter.visible().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["north", "middle", "south"]);
    }

    #[test]
    fn position_less_incidents_never_visible() {
        let store = Rc::new(
            IncidentStore::from_raw(vec![
                raw("ok", "-36.9", "174.7"),
                raw("broken", "garbage", "174.7"),
            ])
            .unwrap(),
        );
        let visible = compute_visible(&store, &wide_bounds());
        assert_eq!(visible, vec![0]);
    }

    #[test]
    fn recompute_without_viewport_is_skipped() {
        let store = three_incident_store();
        let mut filter = ViewportFilter::new(Rc::clone(&store));

        let notified = Rc::new(RefCell::new(0u32));
        let notified_in = Rc::clone(&notified);
        filter.subscribe(move |_| *notified_in.borrow_mut() += 1);

        filter.recompute();
        filter.recompute();
        assert_eq!(*notified.borrow(), 0);
        assert!(filter.visible_indices().is_empty());
        assert!(filter.viewport().is_none());
    }

    #[test]
    fn subscribers_receive_new_indices_on_settle() {
        let store = three_incident_store();
        let mut filter = ViewportFilter::new(Rc::clone(&store));

        let seen: Rc<RefCell<Vec<Vec<usize>>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in = Rc::clone(&seen);
        filter.subscribe(move |visible| seen_in.borrow_mut().push(visible.to_vec()));

        filter.viewport_settled(northern_bounds());
        filter.viewport_settled(wide_bounds());

        assert_eq!(*seen.borrow(), vec![vec![0, 1], vec![0, 1, 2]]);
    }
}
