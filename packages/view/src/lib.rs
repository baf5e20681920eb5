#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Single source of truth for what the traffic map UI renders.
//!
//! [`ViewProjection`] subscribes once to the viewport filter and the
//! selection controller and turns their notifications into an ordered
//! [`ViewCommand`] stream for the embedding application to execute.
//! [`MapAdapter`] executes the map-facing commands against the external
//! widget behind the [`MapSurface`] trait and owns the side mapping from
//! incident ids to marker handles.

mod projection;
mod surface;

pub use projection::{ViewCommand, ViewProjection, count_label};
pub use surface::{FOCUS_ZOOM, MapAdapter, MapSurface, MarkerHandle};
