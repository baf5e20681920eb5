//! Shared parsing utilities for the incident dataset.
//!
//! Coordinates arrive as strings in the dataset format and are parsed to
//! numeric form at load time.

/// Parses lat/long from the dataset's string fields. Returns `None` if
/// either value is unparseable, non-finite, or zero.
#[must_use]
pub fn parse_lat_lng_str(lat: &str, lng: &str) -> Option<(f64, f64)> {
    let latitude = lat.trim().parse::<f64>().ok()?;
    let longitude = lng.trim().parse::<f64>().ok()?;
    if !latitude.is_finite() || !longitude.is_finite() {
        return None;
    }
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}
