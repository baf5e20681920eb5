#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Traffic incident alert-type taxonomy.
//!
//! This crate defines the closed set of alert categories used across the
//! entire traffic-map system. Each category determines the marker icon shown
//! on the map and the human-facing label shown in the incident list and
//! detail popup.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category tag for a traffic incident.
///
/// Tags travel through the dataset format in `snake_case` form (e.g.
/// `"tow_allocation"`). [`Alert`](Self::Alert) is the generic catch-all
/// category that unrecognized tags degrade to at load time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertType {
    /// A tow truck has been allocated to an incident scene
    TowAllocation,
    /// Planned or active road maintenance works
    Roadworks,
    /// A public event affecting traffic (parade, sports fixture, etc.)
    Event,
    /// An emergency-services response in progress
    Emergency,
    /// Generic traffic alert
    Alert,
}

impl AlertType {
    /// Returns the human-facing display label for this category.
    ///
    /// All tags follow the generic capitalize-first-letter rule except
    /// `tow_allocation`, which is the one irregular two-word case.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::TowAllocation => "Tow Allocation".to_string(),
            _ => capitalize_tag(self.as_ref()),
        }
    }

    /// Returns the marker icon asset reference for this category.
    ///
    /// The map collaborator resolves this to an actual image; only the
    /// reference is in scope here.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::TowAllocation => "markers/tow-allocation.png",
            Self::Roadworks => "markers/roadworks.png",
            Self::Event => "markers/event.png",
            Self::Emergency => "markers/emergency.png",
            Self::Alert => "markers/alert.png",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TowAllocation,
            Self::Roadworks,
            Self::Event,
            Self::Emergency,
            Self::Alert,
        ]
    }
}

/// Capitalizes the first character of a tag for display.
fn capitalize_tag(tag: &str) -> String {
    let mut chars = tag.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
