//! Typed views of the documents kept in each collection.

use crate::{Collection, Document, Result, StoreError};
use chrono::{DateTime, Utc};
use records::{LikedEntry, RestaurantRecord, SwipeDirection};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Document id of the stats summary inside the `stats` collection
pub const STATS_SUMMARY_ID: &str = "summary";

/// Entry of `seenRestaurants`, keyed by restaurant id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeenDoc {
    pub name: String,
    /// `"liked"` or `"passed"`
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl SeenDoc {
    pub fn new(record: &RestaurantRecord, direction: SwipeDirection, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: record.name.clone(),
            action: direction.action().to_string(),
            timestamp,
        }
    }
}

/// Entry of `likedRestaurants`: the record snapshot taken at like-time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedDoc {
    #[serde(flatten)]
    pub restaurant: RestaurantRecord,
    pub saved_at: DateTime<Utc>,
}

impl From<&LikedEntry> for LikedDoc {
    fn from(entry: &LikedEntry) -> Self {
        Self {
            restaurant: entry.record.clone(),
            saved_at: entry.saved_at,
        }
    }
}

impl From<LikedDoc> for LikedEntry {
    fn from(doc: LikedDoc) -> Self {
        LikedEntry {
            record: doc.restaurant,
            saved_at: doc.saved_at,
        }
    }
}

/// The `stats/summary` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDoc {
    #[serde(default)]
    pub total_seen: u64,
    #[serde(default)]
    pub total_liked: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Serialize a typed document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize a stored document, naming the offending id on failure.
pub fn from_document<T: DeserializeOwned>(
    collection: Collection,
    id: &str,
    doc: Document,
) -> Result<T> {
    serde_json::from_value(doc).map_err(|e| StoreError::InvalidDocument {
        collection,
        id: id.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seen_doc_shape() {
        let record = RestaurantRecord::new("r1", "Taqueria");
        let at = Utc::now();
        let doc = to_document(&SeenDoc::new(&record, SwipeDirection::Left, at)).unwrap();

        assert_eq!(doc["name"], "Taqueria");
        assert_eq!(doc["action"], "passed");
        assert!(doc.get("timestamp").is_some());
    }

    #[test]
    fn test_liked_doc_flattens_snapshot() {
        let entry = LikedEntry {
            record: RestaurantRecord::new("r2", "Sushi Go").with_rating(4.7, 120),
            saved_at: Utc::now(),
        };
        let doc = to_document(&LikedDoc::from(&entry)).unwrap();
        assert_eq!(doc["id"], "r2");
        assert!(doc.get("savedAt").is_some());

        let back: LikedDoc = from_document(Collection::LikedRestaurants, "r2", doc).unwrap();
        assert_eq!(LikedEntry::from(back), entry);
    }

    #[test]
    fn test_stats_doc_defaults() {
        let stats: StatsDoc =
            from_document(Collection::Stats, STATS_SUMMARY_ID, json!({ "totalSeen": 9 })).unwrap();
        assert_eq!(stats.total_seen, 9);
        assert_eq!(stats.total_liked, 0);
        assert_eq!(stats.last_updated, None);
    }

    #[test]
    fn test_invalid_document_names_id() {
        let result: Result<SeenDoc> =
            from_document(Collection::SeenRestaurants, "bad", json!({ "name": 3 }));
        match result {
            Err(StoreError::InvalidDocument { id, collection, .. }) => {
                assert_eq!(id, "bad");
                assert_eq!(collection, Collection::SeenRestaurants);
            }
            other => panic!("expected InvalidDocument, got {other:?}"),
        }
    }
}
