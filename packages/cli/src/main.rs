#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demo CLI for the traffic map core.
//!
//! Loads an incident dataset, wires the viewport filter, selection
//! controller, and view projection to a simulated map surface, replays the
//! requested session events, and prints every render command the
//! projection emits.

mod simulated;

use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use simulated::SimulatedSurface;
use traffic_map_selection::SelectionController;
use traffic_map_spatial::{LatLng, LatLngBounds};
use traffic_map_store::IncidentStore;
use traffic_map_view::{MapAdapter, MapSurface as _, ViewCommand, ViewProjection};
use traffic_map_viewport::ViewportFilter;

/// Rows that fit in the simulated list before scrolling is needed.
const ROWS_IN_VIEW: usize = 5;

#[derive(Parser)]
#[command(
    name = "traffic_map_cli",
    about = "Replay a traffic map session against a simulated map surface"
)]
struct Args {
    /// Path to the incident dataset (JSON array of raw records).
    #[arg(long, default_value = "data/incidents.sample.json")]
    dataset: PathBuf,

    /// Viewport to settle after load, as `west,south,east,north`.
    /// Defaults to framing the whole dataset.
    #[arg(long)]
    bbox: Option<String>,

    /// Simulate a map-marker click on this incident id.
    #[arg(long)]
    marker_click: Option<String>,

    /// Simulate a list-row click on this incident id.
    #[arg(long)]
    select: Option<String>,

    /// Toggle the mobile list drawer.
    #[arg(long)]
    toggle_drawer: bool,

    /// Dismiss the detail popup at the end of the session.
    #[arg(long)]
    dismiss: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    log::info!("Loading incident dataset from {}", args.dataset.display());
    let json = std::fs::read_to_string(&args.dataset)?;
    let store = Rc::new(IncidentStore::from_json_str(&json)?);
    log::info!(
        "Loaded {} incidents ({} with usable positions)",
        store.len(),
        store.positioned_count()
    );

    let mut adapter = MapAdapter::new(SimulatedSurface::default());
    adapter.sync_markers(&store);
    adapter.fit_all(&store);

    let mut filter = ViewportFilter::new(Rc::clone(&store));
    let mut controller = SelectionController::new(Rc::clone(&store));
    let projection = ViewProjection::attach(Rc::clone(&store), &mut filter, &mut controller);

    let bounds = match args.bbox.as_deref() {
        Some(raw) => parse_bbox(raw).ok_or("invalid --bbox, expected west,south,east,north")?,
        None => adapter
            .viewport()
            .ok_or("map has no viewport (dataset has no positioned incidents?)")?,
    };

    println!("== viewport settled ==");
    filter.viewport_settled(bounds);
    execute(&projection, &mut adapter);

    if let Some(id) = &args.marker_click {
        println!("== marker click: {id} ==");
        controller.marker_clicked(id);
        execute(&projection, &mut adapter);
    }

    if let Some(id) = &args.select {
        println!("== list click: {id} ==");
        controller.list_item_clicked(id);
        execute(&projection, &mut adapter);
    }

    if args.toggle_drawer {
        println!("== drawer toggle ==");
        projection.toggle_drawer();
        execute(&projection, &mut adapter);
    }

    if args.dismiss {
        println!("== dismiss ==");
        controller.dismissed();
        execute(&projection, &mut adapter);
    }

    Ok(())
}

/// Parses a bounding box string `"west,south,east,north"` into
/// [`LatLngBounds`].
fn parse_bbox(s: &str) -> Option<LatLngBounds> {
    let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        Some(LatLngBounds::new(
            LatLng::new(parts[1], parts[0]),
            LatLng::new(parts[3], parts[2]),
        ))
    } else {
        None
    }
}

/// Drains and executes the projection's command stream.
///
/// Row-visibility queries are answered from the simulated list geometry
/// (the first [`ROWS_IN_VIEW`] rows are on screen), which may queue
/// follow-up commands; the loop runs until the stream is dry.
fn execute(projection: &ViewProjection, adapter: &mut MapAdapter<SimulatedSurface>) {
    loop {
        let commands = projection.drain_commands();
        if commands.is_empty() {
            break;
        }
        for command in commands {
            run_command(&command, projection, adapter);
        }
    }
}

fn run_command(
    command: &ViewCommand,
    projection: &ViewProjection,
    adapter: &mut MapAdapter<SimulatedSurface>,
) {
    match command {
        ViewCommand::SetCountLabel(label) => println!("   count: {label}"),
        ViewCommand::RefreshList { ids } => println!("   list: {}", ids.join(", ")),
        ViewCommand::CloseDetail => println!("   detail: closed"),
        ViewCommand::OpenDetail {
            id,
            title,
            category_label,
            ..
        } => {
            let anchor = adapter
                .marker_for(id)
                .map_or_else(|| "no marker".to_string(), |m| format!("marker #{}", m.raw()));
            println!("   detail: \"{title}\" [{category_label}] anchored to {anchor}");
        }
        ViewCommand::CheckRowVisibility { id, generation } => {
            let row = projection.visible_ids().iter().position(|v| v == id);
            let fully_visible = row.is_some_and(|r| r < ROWS_IN_VIEW);
            projection.row_visibility_resolved(*generation, fully_visible);
        }
        ViewCommand::ScrollRowIntoView { id } => println!("   list: scroll {id} into view"),
        ViewCommand::SetDrawerOpen(open) => {
            println!("   drawer: {}", if *open { "open" } else { "closed" });
        }
        ViewCommand::FocusMap { position } => {
            adapter.focus(*position);
            println!(
                "   map: focused ({}, {}) at zoom {}",
                position.lat,
                position.lng,
                adapter.surface().zoom()
            );
        }
    }
}
