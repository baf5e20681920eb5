//! Derives the observable UI state from filter and selection notifications.
//!
//! The projection subscribes once to each publisher and queues
//! [`ViewCommand`]s for the embedding application to drain and execute
//! after every event. Commands are ordered; the two-phase detail teardown
//! ([`ViewCommand::CloseDetail`] before [`ViewCommand::OpenDetail`]) is
//! part of the contract, not an artifact.

use std::cell::RefCell;
use std::rc::Rc;

use traffic_map_selection::{SelectionController, SelectionEvent, SelectionState};
use traffic_map_spatial::LatLng;
use traffic_map_store::IncidentStore;
use traffic_map_viewport::ViewportFilter;

/// Formats the human-facing visible-count label.
///
/// Exactly one incident gets the singular form; zero and everything else
/// are plural.
#[must_use]
pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 incident shown".to_string()
    } else {
        format!("{count} incidents shown")
    }
}

/// A render instruction for the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Re-render the incident list with these ids, in order.
    RefreshList {
        /// Visible incident ids in dataset order.
        ids: Vec<String>,
    },
    /// Update the visible-count label.
    SetCountLabel(String),
    /// Tear down the detail popup.
    CloseDetail,
    /// Build the detail popup for an incident. The anchor marker is
    /// resolved through the map adapter's registry by id.
    OpenDetail {
        /// Incident id (anchor lookup key).
        id: String,
        /// Popup title.
        title: String,
        /// Popup body text.
        description: String,
        /// Display label for the incident's category.
        category_label: String,
    },
    /// Ask the list renderer whether this row is already fully inside the
    /// scrollable area. Answered via
    /// [`ViewProjection::row_visibility_resolved`] with the same
    /// generation.
    CheckRowVisibility {
        /// Row to check.
        id: String,
        /// Selection generation this check belongs to.
        generation: u64,
    },
    /// Scroll the list so this row becomes fully visible.
    ScrollRowIntoView {
        /// Row to scroll to.
        id: String,
    },
    /// Open or close the mobile list drawer.
    SetDrawerOpen(bool),
    /// Re-center the map on this position (raise-only zoom applied by the
    /// map adapter).
    FocusMap {
        /// Target position.
        position: LatLng,
    },
}

/// An unanswered row-visibility query.
struct PendingRowCheck {
    id: String,
    generation: u64,
}

struct ProjectionInner {
    store: Rc<IncidentStore>,
    visible: Vec<usize>,
    selected: Option<String>,
    drawer_open: bool,
    /// Bumped on every new selection; stale visibility answers are
    /// discarded by comparing against it.
    generation: u64,
    pending_check: Option<PendingRowCheck>,
    commands: Vec<ViewCommand>,
}

impl ProjectionInner {
    fn visible_changed(&mut self, visible: &[usize]) {
        self.visible = visible.to_vec();
        let ids = self.visible_ids();
        self.commands.push(ViewCommand::SetCountLabel(count_label(ids.len())));
        self.commands.push(ViewCommand::RefreshList { ids });
    }

    fn visible_ids(&self) -> Vec<String> {
        self.visible
            .iter()
            .filter_map(|&idx| self.store.get(idx))
            .map(|incident| incident.id.clone())
            .collect()
    }

    fn selection_event(&mut self, event: &SelectionEvent) {
        match event {
            SelectionEvent::Cleared => {
                self.selected = None;
                self.pending_check = None;
                self.commands.push(ViewCommand::CloseDetail);
            }
            SelectionEvent::Selected { id, .. } => self.selection_set(id),
            SelectionEvent::FocusRequested { position } => {
                self.commands.push(ViewCommand::FocusMap {
                    position: *position,
                });
            }
        }
    }

    fn selection_set(&mut self, id: &str) {
        let Some((title, description, category_label)) = self.store.by_id(id).map(|incident| {
            (
                incident.title.clone(),
                incident.description.clone(),
                incident.alert_type.label(),
            )
        }) else {
            log::warn!("selection published for unknown incident {id}, ignoring");
            return;
        };

        self.selected = Some(id.to_string());
        self.commands.push(ViewCommand::OpenDetail {
            id: id.to_string(),
            title,
            description,
            category_label,
        });

        // Only rows actually in the list can be scrolled to.
        if self.visible_ids().iter().any(|visible_id| visible_id == id) {
            self.generation += 1;
            self.pending_check = Some(PendingRowCheck {
                id: id.to_string(),
                generation: self.generation,
            });
            self.commands.push(ViewCommand::CheckRowVisibility {
                id: id.to_string(),
                generation: self.generation,
            });
        }
    }

    fn row_visibility_resolved(&mut self, generation: u64, fully_visible: bool) {
        let Some(pending) = self.pending_check.take() else {
            log::debug!("row-visibility answer with no pending check, discarding");
            return;
        };
        if pending.generation != generation {
            // A later selection superseded this check; last write wins.
            log::debug!(
                "stale row-visibility answer (generation {generation} != {}), discarding",
                pending.generation
            );
            self.pending_check = Some(pending);
            return;
        }
        if !fully_visible {
            self.commands.push(ViewCommand::ScrollRowIntoView { id: pending.id });
        }
    }
}

/// The single source of truth for what the UI renders.
///
/// Create with [`ViewProjection::attach`], which subscribes exactly once
/// to the viewport filter and the selection controller. Drive events
/// through those publishers, then drain the resulting commands with
/// [`ViewProjection::drain_commands`].
pub struct ViewProjection {
    inner: Rc<RefCell<ProjectionInner>>,
}

impl ViewProjection {
    /// Builds the projection and subscribes it to both publishers.
    #[must_use]
    pub fn attach(
        store: Rc<IncidentStore>,
        filter: &mut ViewportFilter,
        controller: &mut SelectionController,
    ) -> Self {
        let inner = Rc::new(RefCell::new(ProjectionInner {
            store,
            visible: Vec::new(),
            selected: None,
            drawer_open: false,
            generation: 0,
            pending_check: None,
            commands: Vec::new(),
        }));

        let for_filter = Rc::clone(&inner);
        filter.subscribe(move |visible| for_filter.borrow_mut().visible_changed(visible));

        let for_selection = Rc::clone(&inner);
        controller.subscribe(move |_state: &SelectionState, event| {
            for_selection.borrow_mut().selection_event(event);
        });

        Self { inner }
    }

    /// Takes all queued commands, in the order they were produced.
    #[must_use]
    pub fn drain_commands(&self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.inner.borrow_mut().commands)
    }

    /// Toggles the mobile list drawer. Driven by explicit user action
    /// only; selection changes never touch it.
    pub fn toggle_drawer(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.drawer_open = !inner.drawer_open;
        let open = inner.drawer_open;
        inner.commands.push(ViewCommand::SetDrawerOpen(open));
    }

    /// Whether the mobile list drawer is open.
    #[must_use]
    pub fn drawer_open(&self) -> bool {
        self.inner.borrow().drawer_open
    }

    /// Delivers the asynchronous answer to a
    /// [`ViewCommand::CheckRowVisibility`] query. Answers for superseded
    /// generations are discarded.
    pub fn row_visibility_resolved(&self, generation: u64, fully_visible: bool) {
        self.inner
            .borrow_mut()
            .row_visibility_resolved(generation, fully_visible);
    }

    /// Ids of the currently visible incidents, in dataset order.
    #[must_use]
    pub fn visible_ids(&self) -> Vec<String> {
        self.inner.borrow().visible_ids()
    }

    /// The currently selected incident id, if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.inner.borrow().selected.clone()
    }
}

#[cfg(test)]
mod tests {
    use traffic_map_spatial::{LatLng, LatLngBounds};
    use traffic_map_store::RawIncident;

    use super::*;

    fn raw(id: &str, alert_type: &str, lat: &str, long: &str) -> RawIncident {
        RawIncident {
            id: id.to_string(),
            alert_type: alert_type.to_string(),
            title: format!("Incident {id}"),
            description: "test".to_string(),
            lat: lat.to_string(),
            long: long.to_string(),
        }
    }

    /// Two incidents in the northern bounds, one further south.
    fn rig() -> (ViewportFilter, SelectionController, ViewProjection) {
        let store = Rc::new(
            IncidentStore::from_raw(vec![
                raw("tow", "tow_allocation", "-36.8", "174.7"),
                raw("works", "roadworks", "-36.9", "174.8"),
                raw("south", "event", "-37.3", "174.7"),
            ])
            .unwrap(),
        );
        let mut filter = ViewportFilter::new(Rc::clone(&store));
        let mut controller = SelectionController::new(Rc::clone(&store));
        let projection = ViewProjection::attach(store, &mut filter, &mut controller);
        (filter, controller, projection)
    }

    fn northern_bounds() -> LatLngBounds {
        LatLngBounds::new(LatLng::new(-37.0, 174.0), LatLng::new(-36.0, 175.0))
    }

    #[test]
    fn count_label_pluralization() {
        assert_eq!(count_label(0), "0 incidents shown");
        assert_eq!(count_label(1), "1 incident shown");
        assert_eq!(count_label(2), "2 incidents shown");
        assert_eq!(count_label(41), "41 incidents shown");
    }

    #[test]
    fn viewport_settle_refreshes_list_and_count() {
        let (mut filter, _controller, projection) = rig();

        filter.viewport_settled(northern_bounds());

        assert_eq!(
            projection.drain_commands(),
            vec![
                ViewCommand::SetCountLabel("2 incidents shown".to_string()),
                ViewCommand::RefreshList {
                    ids: vec!["tow".to_string(), "works".to_string()],
                },
            ]
        );
    }

    #[test]
    fn single_visible_incident_uses_singular_label() {
        let (mut filter, _controller, projection) = rig();

        // Only the southern incident.
        filter.viewport_settled(LatLngBounds::new(
            LatLng::new(-37.5, 174.0),
            LatLng::new(-37.1, 175.0),
        ));

        let commands = projection.drain_commands();
        assert_eq!(
            commands[0],
            ViewCommand::SetCountLabel("1 incident shown".to_string())
        );
    }

    #[test]
    fn selection_produces_two_phase_detail_commands() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        let _ = projection.drain_commands();

        controller.marker_clicked("tow");

        let commands = projection.drain_commands();
        assert_eq!(commands[0], ViewCommand::CloseDetail);
        assert!(matches!(
            &commands[1],
            ViewCommand::OpenDetail { id, category_label, .. }
                if id == "tow" && category_label == "Tow Allocation"
        ));
    }

    #[test]
    fn reselecting_produces_two_full_detail_cycles() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        let _ = projection.drain_commands();

        controller.marker_clicked("works");
        controller.marker_clicked("works");

        let phases: Vec<&str> = projection
            .drain_commands()
            .iter()
            .filter_map(|command| match command {
                ViewCommand::CloseDetail => Some("close"),
                ViewCommand::OpenDetail { .. } => Some("open"),
                _ => None,
            })
            .collect();
        assert_eq!(phases, vec!["close", "open", "close", "open"]);
    }

    #[test]
    fn list_click_emits_focus_command() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        let _ = projection.drain_commands();

        controller.list_item_clicked("works");

        let commands = projection.drain_commands();
        assert!(matches!(
            commands.last(),
            Some(ViewCommand::FocusMap { position })
                if (position.lat - -36.9).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn dismissal_closes_detail_once() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        controller.marker_clicked("tow");
        let _ = projection.drain_commands();

        controller.dismissed();
        assert_eq!(projection.drain_commands(), vec![ViewCommand::CloseDetail]);
        assert_eq!(projection.selected_id(), None);

        // Second dismissal is silent all the way through.
        controller.dismissed();
        assert!(projection.drain_commands().is_empty());
    }

    #[test]
    fn visible_row_gets_visibility_check_and_scroll() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        controller.marker_clicked("works");

        let commands = projection.drain_commands();
        let generation = commands
            .iter()
            .find_map(|command| match command {
                ViewCommand::CheckRowVisibility { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("visibility check for a visible row");

        projection.row_visibility_resolved(generation, false);
        assert_eq!(
            projection.drain_commands(),
            vec![ViewCommand::ScrollRowIntoView {
                id: "works".to_string(),
            }]
        );
    }

    #[test]
    fn already_visible_row_is_not_scrolled() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        controller.marker_clicked("works");
        let commands = projection.drain_commands();
        let generation = commands
            .iter()
            .find_map(|command| match command {
                ViewCommand::CheckRowVisibility { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();

        projection.row_visibility_resolved(generation, true);
        assert!(projection.drain_commands().is_empty());
    }

    #[test]
    fn stale_visibility_answer_is_discarded() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());

        controller.marker_clicked("tow");
        let first_generation = projection
            .drain_commands()
            .iter()
            .find_map(|command| match command {
                ViewCommand::CheckRowVisibility { generation, .. } => Some(*generation),
                _ => None,
            })
            .unwrap();

        // A later selection supersedes the outstanding check.
        controller.marker_clicked("works");
        let _ = projection.drain_commands();

        projection.row_visibility_resolved(first_generation, false);
        assert!(projection.drain_commands().is_empty());
    }

    #[test]
    fn off_list_selection_skips_visibility_check() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        let _ = projection.drain_commands();

        // "south" is outside the settled viewport, so it has no list row.
        controller.marker_clicked("south");

        let commands = projection.drain_commands();
        assert!(
            !commands
                .iter()
                .any(|c| matches!(c, ViewCommand::CheckRowVisibility { .. }))
        );
    }

    #[test]
    fn drawer_toggles_independently_of_selection() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        let _ = projection.drain_commands();

        projection.toggle_drawer();
        assert_eq!(
            projection.drain_commands(),
            vec![ViewCommand::SetDrawerOpen(true)]
        );
        assert!(projection.drawer_open());

        // Selection traffic leaves the drawer alone.
        controller.marker_clicked("tow");
        controller.dismissed();
        assert!(
            !projection
                .drain_commands()
                .iter()
                .any(|c| matches!(c, ViewCommand::SetDrawerOpen(_)))
        );
        assert!(projection.drawer_open());

        projection.toggle_drawer();
        assert_eq!(
            projection.drain_commands(),
            vec![ViewCommand::SetDrawerOpen(false)]
        );
    }

    #[test]
    fn pan_scenario_keeps_selection_and_grows_list() {
        let (mut filter, mut controller, projection) = rig();
        filter.viewport_settled(northern_bounds());
        controller.marker_clicked("tow");
        let _ = projection.drain_commands();

        // Pan out to cover all three incidents.
        filter.viewport_settled(LatLngBounds::new(
            LatLng::new(-38.0, 174.0),
            LatLng::new(-36.0, 175.0),
        ));

        let commands = projection.drain_commands();
        assert_eq!(
            commands[1],
            ViewCommand::RefreshList {
                ids: vec![
                    "tow".to_string(),
                    "works".to_string(),
                    "south".to_string(),
                ],
            }
        );
        assert_eq!(projection.selected_id(), Some("tow".to_string()));
    }
}
