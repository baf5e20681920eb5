#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Immutable traffic incident store.
//!
//! The dataset is loaded once at startup and never mutated afterwards.
//! Raw records carry their coordinates as strings; parsing happens here,
//! and records with unusable coordinates stay in the store (for
//! reporting) but never enter any geographic operation.

pub mod parsing;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use traffic_map_incident_models::AlertType;
use traffic_map_spatial::LatLng;

/// Errors that can occur while loading the incident dataset.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two records share the same incident id.
    #[error("duplicate incident id: {id}")]
    DuplicateId {
        /// The offending id.
        id: String,
    },
}

/// A traffic incident record as it appears in the dataset file.
///
/// Coordinates are strings in the source data and are parsed at load
/// time; see [`parsing::parse_lat_lng_str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIncident {
    /// Unique stable identifier.
    pub id: String,
    /// Category tag in `snake_case` form (e.g. `"tow_allocation"`).
    pub alert_type: String,
    /// Short display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Latitude as a string.
    pub lat: String,
    /// Longitude as a string.
    pub long: String,
}

/// A loaded traffic incident.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    /// Unique stable identifier; the join key between markers and list rows.
    pub id: String,
    /// Alert category.
    pub alert_type: AlertType,
    /// Short display title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Parsed position. `None` when the raw coordinates were unusable;
    /// such incidents never appear in the visible set.
    pub position: Option<LatLng>,
}

/// The ordered, immutable collection of incidents for the process lifetime.
///
/// Iteration order is dataset order; the visible set and list rendering
/// both preserve it.
#[derive(Debug, Default)]
pub struct IncidentStore {
    incidents: Vec<Incident>,
    /// id -> index into `incidents`.
    by_id: BTreeMap<String, usize>,
}

impl IncidentStore {
    /// Builds the store from raw dataset records.
    ///
    /// Records with unusable coordinates are kept without a position and
    /// reported via `log::warn!`. Unrecognized alert-type tags degrade to
    /// the generic [`AlertType::Alert`] category with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records share an id.
    pub fn from_raw(raw: Vec<RawIncident>) -> Result<Self, StoreError> {
        let mut incidents = Vec::with_capacity(raw.len());
        let mut by_id = BTreeMap::new();

        for record in raw {
            let alert_type = record.alert_type.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Incident {}: unknown alert type {:?}, treating as generic alert",
                    record.id,
                    record.alert_type
                );
                AlertType::Alert
            });

            let position = parsing::parse_lat_lng_str(&record.lat, &record.long)
                .map(|(lat, lng)| LatLng::new(lat, lng));
            if position.is_none() {
                log::warn!(
                    "Incident {}: unusable coordinates lat={:?} long={:?}, excluded from map",
                    record.id,
                    record.lat,
                    record.long
                );
            }

            if by_id.insert(record.id.clone(), incidents.len()).is_some() {
                return Err(StoreError::DuplicateId { id: record.id });
            }

            incidents.push(Incident {
                id: record.id,
                alert_type,
                title: record.title,
                description: record.description,
                position,
            });
        }

        Ok(Self { incidents, by_id })
    }

    /// Parses a JSON array of raw records and builds the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a duplicate id is
    /// present.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let raw: Vec<RawIncident> = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Number of incidents in the store (including position-less ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Iterates incidents in dataset order.
    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.incidents.iter()
    }

    /// Returns the incident at the given dataset index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Incident> {
        self.incidents.get(index)
    }

    /// Looks up an incident by its id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Incident> {
        self.by_id.get(id).map(|&idx| &self.incidents[idx])
    }

    /// Number of incidents that carry a usable position.
    #[must_use]
    pub fn positioned_count(&self) -> usize {
        self.incidents
            .iter()
            .filter(|i| i.position.is_some())
            .count()
    }
}

impl<'a> IntoIterator for &'a IncidentStore {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
