//! Core domain types for restaurant discovery.
//!
//! This module defines the values that flow through every other crate:
//! - `RestaurantRecord`: immutable value fetched from a candidate source
//! - `SwipeDirection`: the discrete outcome of a committed swipe
//! - `SeenSet` / `LikedSet`: per-user decision state, keyed by record id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable external identifier of a restaurant (the Places `place_id`)
///
/// Unique within one fetch batch and stable across app runs, so it is
/// used as the key for the seen and liked sets.
pub type RestaurantId = String;

/// Identifier of the user whose decisions are being recorded
pub type UserId = String;

/// Mean Earth radius used by the haversine distance, in meters
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// =============================================================================
// Location
// =============================================================================

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_meters(&self, other: &LatLng) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }

    /// Formats as the `lat,lng` pair expected by the Places API.
    pub fn to_query_param(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

// =============================================================================
// Restaurant Record
// =============================================================================

/// Whether a restaurant is open right now.
///
/// Sources frequently omit opening hours, so this is a tri-state rather
/// than a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OpenState {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl From<Option<bool>> for OpenState {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => OpenState::Open,
            Some(false) => OpenState::Closed,
            None => OpenState::Unknown,
        }
    }
}

impl OpenState {
    pub fn as_option(&self) -> Option<bool> {
        match self {
            OpenState::Open => Some(true),
            OpenState::Closed => Some(false),
            OpenState::Unknown => None,
        }
    }
}

/// A restaurant as returned by a candidate source.
///
/// Records are read-only after the fetch. Every optional field may be
/// missing and consumers must treat a missing value as "unknown" rather
/// than as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: RestaurantId,
    pub name: String,
    /// Average rating from 0.0 to 5.0
    pub rating: Option<f32>,
    /// Number of ratings behind `rating`
    pub rating_count: Option<u32>,
    pub open_now: OpenState,
    pub location: Option<LatLng>,
    /// Place types such as `italian_restaurant`, `cafe`, `bar`
    #[serde(default)]
    pub category_tags: BTreeSet<String>,
    /// Opaque photo reference understood by the source
    pub photo_ref: Option<String>,
    /// Short address line
    pub vicinity: Option<String>,
}

impl RestaurantRecord {
    /// Create a record with only the required fields set.
    pub fn new(id: impl Into<RestaurantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: None,
            rating_count: None,
            open_now: OpenState::Unknown,
            location: None,
            category_tags: BTreeSet::new(),
            photo_ref: None,
            vicinity: None,
        }
    }

    pub fn with_rating(mut self, rating: f32, rating_count: u32) -> Self {
        self.rating = Some(rating);
        self.rating_count = Some(rating_count);
        self
    }

    pub fn with_open_now(mut self, open: bool) -> Self {
        self.open_now = OpenState::from(Some(open));
        self
    }

    pub fn with_location(mut self, location: LatLng) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.category_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.category_tags.contains(tag)
    }
}

// =============================================================================
// Decisions
// =============================================================================

/// Direction of a committed swipe.
///
/// `Right` means "like", `Left` means "pass".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn is_like(&self) -> bool {
        matches!(self, SwipeDirection::Right)
    }

    /// Action label stored alongside a seen record.
    pub fn action(&self) -> &'static str {
        match self {
            SwipeDirection::Right => "liked",
            SwipeDirection::Left => "passed",
        }
    }

    /// Direction matching the sign of a horizontal translation.
    pub fn from_translation(dx: f32) -> Self {
        if dx < 0.0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        }
    }

    /// +1.0 for right, -1.0 for left.
    pub fn sign(&self) -> f32 {
        match self {
            SwipeDirection::Right => 1.0,
            SwipeDirection::Left => -1.0,
        }
    }
}

/// Ids of every restaurant the user has committed a decision on.
///
/// Grows monotonically during a session; only `clear` (reset progress)
/// shrinks it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    ids: HashSet<RestaurantId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns true if the id was not already present.
    pub fn insert(&mut self, id: impl Into<RestaurantId>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestaurantId> {
        self.ids.iter()
    }

    /// Removes everything and returns what was removed.
    pub fn clear(&mut self) -> Vec<RestaurantId> {
        self.ids.drain().collect()
    }
}

impl<T: Into<RestaurantId>> FromIterator<T> for SeenSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A liked restaurant plus the snapshot taken when it was liked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedEntry {
    pub record: RestaurantRecord,
    pub saved_at: DateTime<Utc>,
}

/// Restaurants the user swiped right on, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikedSet {
    entries: HashMap<RestaurantId, LikedEntry>,
}

impl LikedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&LikedEntry> {
        self.entries.get(id)
    }

    /// Insert or replace the snapshot for `entry.record.id`.
    pub fn insert(&mut self, entry: LikedEntry) {
        self.entries.insert(entry.record.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<LikedEntry> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LikedEntry> {
        self.entries.values()
    }

    /// Entries ordered newest first, ties broken by id for a stable listing.
    pub fn by_most_recent(&self) -> Vec<&LikedEntry> {
        let mut entries: Vec<&LikedEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });
        entries
    }
}

impl FromIterator<LikedEntry> for LikedSet {
    fn from_iter<I: IntoIterator<Item = LikedEntry>>(iter: I) -> Self {
        let mut set = LikedSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}
