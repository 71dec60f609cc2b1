//! Parser for Places "nearby search" payloads.
//!
//! The payload envelope looks like:
//! ```json
//! { "status": "OK", "results": [ { "place_id": "...", "name": "...", ... } ] }
//! ```
//!
//! Entries are mapped into `RestaurantRecord` values. A single bad entry never
//! fails the whole batch: entries without a `place_id` are dropped, every other
//! missing field falls back to "unknown".

use crate::error::{RecordError, Result};
use crate::types::*;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Name used when an entry has no usable `name`
pub const UNKNOWN_NAME: &str = "Unknown";

// Raw wire shapes. Everything is optional so that serde never rejects an
// individual entry; validation happens in `into_record`.

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<RawPlace>,
    status: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: Option<String>,
    name: Option<String>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    opening_hours: Option<RawOpeningHours>,
    geometry: Option<RawGeometry>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<RawPhoto>,
    vicinity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOpeningHours {
    open_now: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: Option<RawLatLng>,
}

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    photo_reference: Option<String>,
}

impl RawPlace {
    /// Convert to a record, or `None` if the entry cannot be keyed.
    fn into_record(self) -> Option<RestaurantRecord> {
        let id = self.place_id.filter(|id| !id.trim().is_empty())?;

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        let rating = self
            .rating
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0) as f32);

        let location = self
            .geometry
            .and_then(|g| g.location)
            .filter(|l| l.lat.is_finite() && l.lng.is_finite())
            .map(|l| LatLng::new(l.lat, l.lng));

        Some(RestaurantRecord {
            id,
            name,
            rating,
            rating_count: self.user_ratings_total,
            open_now: OpenState::from(self.opening_hours.and_then(|h| h.open_now)),
            location,
            category_tags: self.types.into_iter().collect(),
            photo_ref: self.photos.into_iter().find_map(|p| p.photo_reference),
            vicinity: self.vicinity,
        })
    }
}

/// Parse a nearby-search payload into restaurant records.
///
/// ## Algorithm
/// 1. Deserialize the envelope and check `status`
/// 2. Convert entries in parallel (rayon keeps the input order)
/// 3. Drop entries without an id, then drop duplicate ids (first one wins)
///
/// # Errors
/// Returns `RecordError::Json` for a malformed envelope and
/// `RecordError::ApiStatus` for any status other than `OK` / `ZERO_RESULTS`.
pub fn parse_nearby_response(payload: &str) -> Result<Vec<RestaurantRecord>> {
    let response: NearbyResponse = serde_json::from_str(payload)?;

    match response.status.as_deref() {
        None | Some("OK") => {}
        Some("ZERO_RESULTS") => return Ok(Vec::new()),
        Some(other) => {
            return Err(RecordError::ApiStatus {
                status: other.to_string(),
                message: response.error_message.unwrap_or_default(),
            });
        }
    }

    let total = response.results.len();
    let converted: Vec<Option<RestaurantRecord>> = response
        .results
        .into_par_iter()
        .map(RawPlace::into_record)
        .collect();

    let mut seen_ids: HashSet<RestaurantId> = HashSet::with_capacity(total);
    let mut records = Vec::with_capacity(total);
    for record in converted.into_iter().flatten() {
        if seen_ids.insert(record.id.clone()) {
            records.push(record);
        } else {
            debug!("Dropping duplicate place id {}", record.id);
        }
    }

    if records.len() < total {
        warn!(
            "Skipped {} of {} places (missing or duplicate place_id)",
            total - records.len(),
            total
        );
    }
    Ok(records)
}

/// Load a nearby-search payload from a file on disk.
pub fn load_fixture(path: &Path) -> Result<Vec<RestaurantRecord>> {
    if !path.exists() {
        return Err(RecordError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let payload = std::fs::read_to_string(path)?;
    parse_nearby_response(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "status": "OK",
        "results": [
            {
                "place_id": "p1",
                "name": "Trattoria Uno",
                "rating": 4.6,
                "user_ratings_total": 812,
                "opening_hours": { "open_now": true },
                "geometry": { "location": { "lat": 37.77, "lng": -122.41 } },
                "types": ["italian_restaurant", "restaurant", "food"],
                "photos": [{ "photo_reference": "ref-1" }],
                "vicinity": "1 Market St"
            },
            { "place_id": "p2" },
            { "name": "No Id Diner" },
            { "place_id": "p1", "name": "Duplicate" }
        ]
    }"#;

    #[test]
    fn test_parse_full_entry() {
        let records = parse_nearby_response(SAMPLE).unwrap();
        let first = &records[0];

        assert_eq!(first.id, "p1");
        assert_eq!(first.name, "Trattoria Uno");
        assert_eq!(first.rating, Some(4.6));
        assert_eq!(first.rating_count, Some(812));
        assert_eq!(first.open_now, OpenState::Open);
        assert!(first.has_tag("italian_restaurant"));
        assert_eq!(first.photo_ref.as_deref(), Some("ref-1"));
        assert_eq!(first.vicinity.as_deref(), Some("1 Market St"));
    }

    #[test]
    fn test_parse_defaults_missing_fields() {
        let records = parse_nearby_response(SAMPLE).unwrap();
        let sparse = &records[1];

        assert_eq!(sparse.id, "p2");
        assert_eq!(sparse.name, UNKNOWN_NAME);
        assert_eq!(sparse.rating, None);
        assert_eq!(sparse.open_now, OpenState::Unknown);
        assert!(sparse.location.is_none());
        assert!(sparse.category_tags.is_empty());
    }

    #[test]
    fn test_parse_skips_unkeyed_and_duplicates() {
        let records = parse_nearby_response(SAMPLE).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(records[0].name, "Trattoria Uno");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let records = parse_nearby_response(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_error_status() {
        let err = parse_nearby_response(
            r#"{"status":"REQUEST_DENIED","error_message":"bad key","results":[]}"#,
        )
        .unwrap_err();
        match err {
            RecordError::ApiStatus { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rating_is_clamped() {
        let records =
            parse_nearby_response(r#"{"results":[{"place_id":"x","rating":7.5}]}"#).unwrap();
        assert_eq!(records[0].rating, Some(5.0));
    }

    #[test]
    fn test_load_fixture_missing_file() {
        let result = load_fixture(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(RecordError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_fixture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nearby.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let records = load_fixture(&path).unwrap();
        assert_eq!(records.len(), 2);
    }
}
