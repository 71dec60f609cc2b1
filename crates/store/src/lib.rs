//! Remote persistence port for per-user swipe decisions.
//!
//! The swipe engine never talks to a concrete database. It depends on the
//! [`PersistencePort`] trait, supplied by the host application, and issues
//! only four kinds of operation against it:
//! - read-all of a collection (once, at session start)
//! - upsert of one document
//! - delete of one document
//! - merge-update of one document
//!
//! No multi-document transaction is assumed. Each user owns three
//! collections: `seenRestaurants`, `likedRestaurants` and `stats`.

use std::fmt;
use std::future::Future;
use thiserror::Error;

pub mod documents;
pub mod json_file;
pub mod memory;

pub use documents::{LikedDoc, SeenDoc, StatsDoc, STATS_SUMMARY_ID};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A schemaless stored document
pub type Document = serde_json::Value;

/// Errors that can occur when interacting with a persistence backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document {id} in {collection}: {reason}")]
    InvalidDocument {
        collection: Collection,
        id: String,
        reason: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;

/// Per-user sub-collections the engine writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    SeenRestaurants,
    LikedRestaurants,
    Stats,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::SeenRestaurants,
        Collection::LikedRestaurants,
        Collection::Stats,
    ];

    /// Name of the collection in the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::SeenRestaurants => "seenRestaurants",
            Collection::LikedRestaurants => "likedRestaurants",
            Collection::Stats => "stats",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Collection::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstraction over the remote persistence service.
///
/// Implementations must be safe to call from several in-flight operations
/// at once; the engine only guarantees that concurrent operations target
/// different documents.
pub trait PersistencePort: Send + Sync {
    /// Read every document of one user's collection as `(id, document)` pairs.
    fn read_all(
        &self,
        user: &str,
        collection: Collection,
    ) -> impl Future<Output = Result<Vec<(String, Document)>>> + Send;

    /// Create or fully replace one document.
    fn upsert(
        &self,
        user: &str,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete one document. Deleting a missing document is not an error.
    fn delete(
        &self,
        user: &str,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Shallow-merge the top-level fields of `doc` into one document,
    /// creating it when absent.
    fn merge(
        &self,
        user: &str,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Apply merge semantics shared by the bundled backends.
///
/// Objects merge key by key; anything else replaces the stored value.
pub(crate) fn merge_documents(existing: &mut Document, update: Document) {
    match (existing, update) {
        (Document::Object(current), Document::Object(incoming)) => {
            for (key, value) in incoming {
                current.insert(key, value);
            }
        }
        (slot, update) => *slot = update,
    }
}
