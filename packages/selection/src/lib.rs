#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident selection state machine.
//!
//! At most one incident is selected at any time. Every selection — even a
//! re-click of the already-selected incident — runs a full clear-then-set
//! cycle: the state passes through [`SelectionState::Unselected`] and the
//! [`SelectionEvent::Cleared`] notification fires before the new selection
//! is published. A detail-view renderer keyed on "is something selected"
//! is therefore guaranteed to tear down the previous popup (and its
//! anchor) before building the new one.

use std::rc::Rc;

use traffic_map_spatial::LatLng;
use traffic_map_store::IncidentStore;

/// Current selection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// No incident selected.
    #[default]
    Unselected,
    /// Exactly one incident selected, by id.
    Selected(String),
}

/// Which surface the user clicked to select an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    /// Click on the map marker.
    Marker,
    /// Click on the incident list row.
    List,
}

/// Notifications published by the [`SelectionController`].
///
/// Listeners receive the controller state alongside each event; during
/// [`Cleared`](Self::Cleared) the state is observably
/// [`SelectionState::Unselected`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The previous selection (if any) is gone; detail views must tear
    /// down.
    Cleared,
    /// A new selection is established.
    Selected {
        /// Selected incident id.
        id: String,
        /// Surface the selection came from.
        origin: SelectionOrigin,
    },
    /// The map should re-center on this position and raise zoom to at
    /// least the focus threshold. Published for list-row clicks only.
    FocusRequested {
        /// The selected incident's position.
        position: LatLng,
    },
}

type SelectionListener = Box<dyn FnMut(&SelectionState, &SelectionEvent)>;

/// Tracks which single incident (if any) is selected and publishes
/// transitions to its subscribers.
pub struct SelectionController {
    store: Rc<IncidentStore>,
    state: SelectionState,
    listeners: Vec<SelectionListener>,
}

impl SelectionController {
    /// Creates an unselected controller over the given store.
    #[must_use]
    pub fn new(store: Rc<IncidentStore>) -> Self {
        Self {
            store,
            state: SelectionState::Unselected,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for selection transitions.
    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionState, &SelectionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The current selection state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Handles a click on an incident's map marker.
    pub fn marker_clicked(&mut self, id: &str) {
        self.select(id, SelectionOrigin::Marker);
    }

    /// Handles a click on an incident's list row.
    ///
    /// Beyond the clear-then-set cycle this also requests that the map
    /// re-center on the incident.
    pub fn list_item_clicked(&mut self, id: &str) {
        self.select(id, SelectionOrigin::List);
    }

    /// Handles the detail popup being dismissed.
    ///
    /// Strict no-op when nothing is selected: no state change, no
    /// notification.
    pub fn dismissed(&mut self) {
        if self.state == SelectionState::Unselected {
            return;
        }
        self.state = SelectionState::Unselected;
        self.publish(&SelectionEvent::Cleared);
    }

    fn select(&mut self, id: &str, origin: SelectionOrigin) {
        let Some(position) = self.store.by_id(id).map(|incident| incident.position) else {
            log::warn!("selection requested for unknown incident {id}, treating as dismissal");
            self.dismissed();
            return;
        };

        // Phase 1: clear. Runs unconditionally so a re-click of the
        // already-selected incident still tears the detail view down.
        self.state = SelectionState::Unselected;
        self.publish(&SelectionEvent::Cleared);

        // Phase 2: set.
        self.state = SelectionState::Selected(id.to_string());
        self.publish(&SelectionEvent::Selected {
            id: id.to_string(),
            origin,
        });

        if origin == SelectionOrigin::List {
            if let Some(position) = position {
                self.publish(&SelectionEvent::FocusRequested { position });
            } else {
                log::warn!("cannot re-center map on incident {id}: no usable position");
            }
        }
    }

    fn publish(&mut self, event: &SelectionEvent) {
        for listener in &mut self.listeners {
            listener(&self.state, event);
        }
    }
}
