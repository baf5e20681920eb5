#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geographic primitives for the traffic map.
//!
//! Defines [`LatLng`] points and [`LatLngBounds`] viewport regions, with
//! point containment delegated to the `geo` crate via the [`Region`] trait.
//! The containment predicate is the collaborator's definition, not
//! re-derived geometry; callers must never assume particular edge
//! semantics.

use geo::{Contains, Point, Rect};
use serde::{Deserialize, Serialize};

/// A geographic point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A geographic region that can answer point containment queries.
///
/// The viewport filter treats any region as a black-box predicate so that
/// the visible set always agrees with whatever the map widget reports.
pub trait Region {
    /// Returns `true` if the point lies within this region.
    fn contains(&self, point: LatLng) -> bool;
}

/// A viewport bounding region as a south-west / north-east corner pair,
/// matching the shape the map widget reports after each gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLngBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Creates bounds from a south-west and north-east corner.
    #[must_use]
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Builds the tightest bounds enclosing all of the given points.
    ///
    /// Returns `None` when the iterator is empty. Used for the initial
    /// fit-to-dataset framing.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for p in points {
            bounds.south_west.lat = bounds.south_west.lat.min(p.lat);
            bounds.south_west.lng = bounds.south_west.lng.min(p.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(p.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(p.lng);
        }
        Some(bounds)
    }

    /// Whether the west edge lies east of the east edge, i.e. the viewport
    /// wraps across the antimeridian.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.south_west.lng > self.north_east.lng
    }
}

impl Region for LatLngBounds {
    fn contains(&self, point: LatLng) -> bool {
        let p = Point::new(point.lng, point.lat);
        if self.crosses_antimeridian() {
            // Split into the two half-boxes on either side of the seam.
            let west_half = Rect::new(
                (self.south_west.lng, self.south_west.lat),
                (180.0, self.north_east.lat),
            );
            let east_half = Rect::new(
                (-180.0, self.south_west.lat),
                (self.north_east.lng, self.north_east.lat),
            );
            west_half.contains(&p) || east_half.contains(&p)
        } else {
            Rect::new(
                (self.south_west.lng, self.south_west.lat),
                (self.north_east.lng, self.north_east.lat),
            )
            .contains(&p)
        }
    }
}
