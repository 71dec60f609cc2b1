//! In-process persistence backend.
//!
//! Keeps every document in memory. Besides serving hosts that do not need
//! durability, it can simulate an unreliable remote: reads and writes can be
//! switched to fail, and writes can be slowed down.

use crate::{merge_documents, Collection, Document, PersistencePort, Result, StoreError};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

type Key = (String, Collection);

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<Key, BTreeMap<String, Document>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Option<Duration>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every write sleeps for `delay` before applying.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of write operations that were applied successfully.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Synchronous lookup, mainly for assertions.
    pub fn get(&self, user: &str, collection: Collection, id: &str) -> Option<Document> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&(user.to_string(), collection))
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Number of documents in one user's collection.
    pub fn count(&self, user: &str, collection: Collection) -> usize {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.get(&(user.to_string(), collection))
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Seed a document without going through the write path.
    pub fn insert(&self, user: &str, collection: Collection, id: &str, doc: Document) {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.entry((user.to_string(), collection))
            .or_default()
            .insert(id.to_string(), doc);
    }

    async fn before_write(&self, op: &str) -> Result<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op} rejected")));
        }
        Ok(())
    }

    fn with_collection<T>(
        &self,
        user: &str,
        collection: Collection,
        f: impl FnOnce(&mut BTreeMap<String, Document>) -> T,
    ) -> T {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        let docs = data.entry((user.to_string(), collection)).or_default();
        let result = f(docs);
        self.writes.fetch_add(1, Ordering::SeqCst);
        result
    }
}

impl PersistencePort for MemoryStore {
    async fn read_all(&self, user: &str, collection: Collection) -> Result<Vec<(String, Document)>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {collection} rejected")));
        }
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data
            .get(&(user.to_string(), collection))
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, user: &str, collection: Collection, id: &str, doc: Document) -> Result<()> {
        self.before_write("upsert").await?;
        trace!(user, %collection, id, "memory upsert");
        self.with_collection(user, collection, |docs| {
            docs.insert(id.to_string(), doc);
        });
        Ok(())
    }

    async fn delete(&self, user: &str, collection: Collection, id: &str) -> Result<()> {
        self.before_write("delete").await?;
        trace!(user, %collection, id, "memory delete");
        self.with_collection(user, collection, |docs| {
            docs.remove(id);
        });
        Ok(())
    }

    async fn merge(&self, user: &str, collection: Collection, id: &str, doc: Document) -> Result<()> {
        self.before_write("merge").await?;
        trace!(user, %collection, id, "memory merge");
        self.with_collection(user, collection, |docs| match docs.get_mut(id) {
            Some(existing) => merge_documents(existing, doc),
            None => {
                docs.insert(id.to_string(), doc);
            }
        });
        Ok(())
    }
}
