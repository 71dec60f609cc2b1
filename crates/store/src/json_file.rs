//! JSON file-based persistence backend.
//!
//! Stores every user's collections in a single human-readable JSON file.
//! Writes go to a temporary file that is then renamed over the target, so
//! the file is never left half-written.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "users": {
//!     "local": {
//!       "seenRestaurants": { "place-1": { "name": "...", "action": "liked", "timestamp": "..." } },
//!       "likedRestaurants": { "place-1": { "id": "place-1", "name": "...", "savedAt": "..." } },
//!       "stats": { "summary": { "totalSeen": 1, "totalLiked": 1 } }
//!     }
//!   }
//! }
//! ```

use crate::{merge_documents, Collection, Document, PersistencePort, Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

type UserCollections = BTreeMap<String, BTreeMap<String, Document>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    version: u32,
    #[serde(default)]
    users: BTreeMap<String, UserCollections>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: 1,
            users: BTreeMap::new(),
        }
    }
}

/// File-backed store; the whole dataset is cached in memory.
pub struct JsonFileStore {
    file_path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store at `file_path`, creating parent directories.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file
    /// is an error.
    pub async fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = if tokio::fs::try_exists(&file_path).await? {
            let contents = tokio::fs::read_to_string(&file_path).await?;
            let data: StoreData = serde_json::from_str(&contents)?;
            debug!(path = ?file_path, users = data.users.len(), "loaded store file");
            data
        } else {
            debug!(path = ?file_path, "starting empty store file");
            StoreData::default()
        };

        Ok(Self {
            file_path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn save(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let tmp_path = self.file_path.with_extension("tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.file_path).await?;
        Ok(())
    }

    /// Apply `f` to one collection and persist the result while still holding the lock.
    async fn write_with<F>(&self, user: &str, collection: Collection, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, Document>) + Send,
    {
        let mut data = self.data.lock().await;
        let docs = data
            .users
            .entry(user.to_string())
            .or_default()
            .entry(collection.as_str().to_string())
            .or_default();
        f(docs);
        self.save(&data).await
    }
}

impl PersistencePort for JsonFileStore {
    async fn read_all(&self, user: &str, collection: Collection) -> Result<Vec<(String, Document)>> {
        let data = self.data.lock().await;
        Ok(data
            .users
            .get(user)
            .and_then(|collections| collections.get(collection.as_str()))
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, user: &str, collection: Collection, id: &str, doc: Document) -> Result<()> {
        self.write_with(user, collection, |docs| {
            docs.insert(id.to_string(), doc);
        })
        .await
    }

    async fn delete(&self, user: &str, collection: Collection, id: &str) -> Result<()> {
        self.write_with(user, collection, |docs| {
            docs.remove(id);
        })
        .await
    }

    async fn merge(&self, user: &str, collection: Collection, id: &str, doc: Document) -> Result<()> {
        if !doc.is_object() {
            return Err(StoreError::InvalidDocument {
                collection,
                id: id.to_string(),
                reason: "merge update must be an object".to_string(),
            });
        }
        self.write_with(user, collection, |docs| match docs.get_mut(id) {
            Some(existing) => merge_documents(existing, doc),
            None => {
                docs.insert(id.to_string(), doc);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .upsert("local", Collection::SeenRestaurants, "a", json!({ "action": "liked" }))
            .await
            .unwrap();
        store
            .merge("local", Collection::Stats, "summary", json!({ "totalSeen": 1 }))
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let seen = reopened
            .read_all("local", Collection::SeenRestaurants)
            .await
            .unwrap();
        assert_eq!(seen, vec![("a".to_string(), json!({ "action": "liked" }))]);

        let stats = reopened.read_all("local", Collection::Stats).await.unwrap();
        assert_eq!(stats[0].1["totalSeen"], 1);
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_delete_and_merge_validation() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).await.unwrap();

        store
            .upsert("local", Collection::LikedRestaurants, "a", json!({ "id": "a" }))
            .await
            .unwrap();
        store
            .delete("local", Collection::LikedRestaurants, "a")
            .await
            .unwrap();
        assert!(store
            .read_all("local", Collection::LikedRestaurants)
            .await
            .unwrap()
            .is_empty());

        let err = store
            .merge("local", Collection::Stats, "summary", json!(3))
            .await;
        assert!(matches!(err, Err(StoreError::InvalidDocument { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
