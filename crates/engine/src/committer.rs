//! Decision committer.
//!
//! Every decision lands in the local sets first, synchronously. The matching
//! remote writes are queued for a single background writer task and applied
//! in order. A write that fails is logged and dropped: local state stays the
//! source of truth for the session and is never rolled back.

use crate::context::SessionContext;
use crate::stats::{StatsAggregator, SwipeStats};
use chrono::Utc;
use records::{LikedEntry, LikedSet, RestaurantId, RestaurantRecord, SeenSet, SwipeDirection, UserId};
use std::sync::Arc;
use store::documents::to_document;
use store::{Collection, LikedDoc, PersistencePort, SeenDoc, StatsDoc, STATS_SUMMARY_ID};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One queued remote mutation.
#[derive(Debug)]
pub enum RemoteWrite {
    Seen { id: RestaurantId, doc: SeenDoc },
    Liked { id: RestaurantId, doc: LikedDoc },
    Unliked { id: RestaurantId },
    Stats(StatsDoc),
    ForgetSeen { ids: Vec<RestaurantId> },
    /// Completes once every write queued before it has been attempted.
    Barrier(oneshot::Sender<()>),
}

impl RemoteWrite {
    fn label(&self) -> &'static str {
        match self {
            RemoteWrite::Seen { .. } => "seen upsert",
            RemoteWrite::Liked { .. } => "liked upsert",
            RemoteWrite::Unliked { .. } => "liked delete",
            RemoteWrite::Stats(_) => "stats merge",
            RemoteWrite::ForgetSeen { .. } => "seen reset",
            RemoteWrite::Barrier(_) => "barrier",
        }
    }
}

pub struct DecisionCommitter {
    seen: SeenSet,
    liked: LikedSet,
    stats: StatsAggregator,
    /// False when the preloaded stats are not the stored totals.
    stats_remote: bool,
    tx: Option<mpsc::UnboundedSender<RemoteWrite>>,
    writer: Option<JoinHandle<()>>,
}

impl DecisionCommitter {
    /// Start from a preloaded context and spawn the writer task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<P: PersistencePort + 'static>(
        store: Arc<P>,
        user: UserId,
        context: SessionContext,
        flush_every: u32,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(store, user, rx));

        Self {
            seen: context.seen,
            liked: context.liked,
            stats: StatsAggregator::new(context.stats, flush_every),
            stats_remote: !context.stats_unavailable,
            tx: Some(tx),
            writer: Some(writer),
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn liked(&self) -> &LikedSet {
        &self.liked
    }

    pub fn stats(&self) -> SwipeStats {
        self.stats.stats()
    }

    /// Record a decision on `record`. Never blocks on I/O.
    ///
    /// A pass on a previously liked record removes the like, locally and
    /// remotely.
    pub fn commit(&mut self, record: &RestaurantRecord, direction: SwipeDirection) {
        let now = Utc::now();
        let id = record.id.clone();

        self.seen.insert(id.clone());
        let unliked = match direction {
            SwipeDirection::Right => {
                self.liked.insert(LikedEntry {
                    record: record.clone(),
                    saved_at: now,
                });
                false
            }
            SwipeDirection::Left => self.liked.remove(&id).is_some(),
        };
        let flush_due = self.stats.on_commit(direction);

        debug!("Committed {} as {}", id, direction.action());

        self.enqueue(RemoteWrite::Seen {
            id: id.clone(),
            doc: SeenDoc::new(record, direction, now),
        });
        if direction.is_like() {
            self.enqueue(RemoteWrite::Liked {
                id,
                doc: LikedDoc {
                    restaurant: record.clone(),
                    saved_at: now,
                },
            });
        } else if unliked {
            self.enqueue(RemoteWrite::Unliked { id });
        }
        if flush_due {
            self.enqueue_stats();
        }
    }

    /// Remove a favorite. The record stays seen.
    pub fn unlike(&mut self, id: &str) -> Option<LikedEntry> {
        let entry = self.liked.remove(id)?;
        self.enqueue(RemoteWrite::Unliked { id: id.to_string() });
        Some(entry)
    }

    /// Forget every seen record, locally and remotely. Favorites and stats
    /// are kept. Returns how many records were forgotten.
    pub fn reset_progress(&mut self) -> usize {
        let ids = self.seen.clear();
        let count = ids.len();
        if count > 0 {
            self.enqueue(RemoteWrite::ForgetSeen { ids });
        }
        info!("Reset progress: forgot {} seen restaurants", count);
        count
    }

    /// Push pending stats and wait until every queued write has been attempted.
    pub async fn flush(&mut self) {
        if self.stats.has_pending() {
            self.enqueue_stats();
        }
        let (done_tx, done_rx) = oneshot::channel();
        if self.enqueue(RemoteWrite::Barrier(done_tx)) {
            let _ = done_rx.await;
        }
    }

    /// Push pending stats, stop accepting writes and wait for the queue to drain.
    pub async fn close(&mut self) {
        if self.stats.has_pending() {
            self.enqueue_stats();
        }
        self.tx = None;
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                warn!("Remote writer ended abnormally: {}", e);
            }
        }
    }

    fn enqueue_stats(&mut self) {
        let doc = self.stats.stats().to_doc(Utc::now());
        self.stats.mark_flushed();
        if !self.stats_remote {
            debug!("Stats preload failed, not overwriting stored totals");
            return;
        }
        self.enqueue(RemoteWrite::Stats(doc));
    }

    fn enqueue(&self, write: RemoteWrite) -> bool {
        let Some(tx) = &self.tx else {
            warn!("Committer closed, dropping {}", write.label());
            return false;
        };
        if let Err(e) = tx.send(write) {
            warn!("Remote writer gone, dropping {}", e.0.label());
            return false;
        }
        true
    }
}

async fn run_writer<P: PersistencePort>(
    store: Arc<P>,
    user: UserId,
    mut rx: mpsc::UnboundedReceiver<RemoteWrite>,
) {
    while let Some(write) = rx.recv().await {
        if let RemoteWrite::Barrier(done) = write {
            let _ = done.send(());
            continue;
        }
        let label = write.label();
        match apply_write(store.as_ref(), &user, write).await {
            Ok(()) => debug!("Remote {} applied", label),
            Err(e) => warn!("Remote {} failed, keeping local state: {}", label, e),
        }
    }
    debug!("Remote writer for {} stopped", user);
}

async fn apply_write<P: PersistencePort>(store: &P, user: &str, write: RemoteWrite) -> store::Result<()> {
    match write {
        RemoteWrite::Seen { id, doc } => {
            store
                .upsert(user, Collection::SeenRestaurants, &id, to_document(&doc)?)
                .await
        }
        RemoteWrite::Liked { id, doc } => {
            store
                .upsert(user, Collection::LikedRestaurants, &id, to_document(&doc)?)
                .await
        }
        RemoteWrite::Unliked { id } => store.delete(user, Collection::LikedRestaurants, &id).await,
        RemoteWrite::Stats(doc) => {
            store
                .merge(user, Collection::Stats, STATS_SUMMARY_ID, to_document(&doc)?)
                .await
        }
        RemoteWrite::ForgetSeen { ids } => {
            let mut failed = 0;
            for id in &ids {
                if let Err(e) = store.delete(user, Collection::SeenRestaurants, id).await {
                    debug!("Failed to delete seen {}: {}", id, e);
                    failed += 1;
                }
            }
            if failed > 0 {
                warn!("{} of {} seen deletions failed", failed, ids.len());
            }
            Ok(())
        }
        RemoteWrite::Barrier(done) => {
            let _ = done.send(());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::MemoryStore;

    fn committer(store: &Arc<MemoryStore>) -> DecisionCommitter {
        DecisionCommitter::spawn(store.clone(), "u1".to_string(), SessionContext::default(), 5)
    }

    fn record(id: &str) -> RestaurantRecord {
        RestaurantRecord::new(id, format!("Restaurant {id}")).with_rating(4.2, 80)
    }

    #[tokio::test]
    async fn test_like_then_pass_removes_like() {
        let store = Arc::new(MemoryStore::new());
        let mut committer = committer(&store);
        let a = record("a");

        committer.commit(&a, SwipeDirection::Right);
        assert!(committer.liked().contains("a"));

        committer.commit(&a, SwipeDirection::Left);
        assert!(committer.seen().contains("a"));
        assert!(!committer.liked().contains("a"));

        committer.flush().await;
        assert!(store.get("u1", Collection::LikedRestaurants, "a").is_none());
        let seen = store.get("u1", Collection::SeenRestaurants, "a").unwrap();
        assert_eq!(seen["action"], "passed");
    }

    #[tokio::test]
    async fn test_local_state_updates_before_remote() {
        let store = Arc::new(MemoryStore::new().with_write_delay(std::time::Duration::from_millis(50)));
        let mut committer = committer(&store);

        committer.commit(&record("a"), SwipeDirection::Right);
        assert!(committer.seen().contains("a"));
        assert!(committer.liked().contains("a"));
        assert_eq!(store.count("u1", Collection::SeenRestaurants), 0);

        committer.flush().await;
        assert_eq!(store.count("u1", Collection::SeenRestaurants), 1);
        assert_eq!(store.count("u1", Collection::LikedRestaurants), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_local_state() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let mut committer = committer(&store);

        committer.commit(&record("a"), SwipeDirection::Right);
        committer.flush().await;

        assert!(committer.seen().contains("a"));
        assert!(committer.liked().contains("a"));
        assert_eq!(store.write_count(), 0);

        // No retry once the store recovers
        store.set_fail_writes(false);
        committer.flush().await;
        assert!(store.get("u1", Collection::SeenRestaurants, "a").is_none());
    }

    #[tokio::test]
    async fn test_stats_flushed_every_n_commits() {
        let store = Arc::new(MemoryStore::new());
        let mut committer = DecisionCommitter::spawn(store.clone(), "u1".to_string(), SessionContext::default(), 2);

        committer.commit(&record("a"), SwipeDirection::Right);
        committer.commit(&record("b"), SwipeDirection::Left);
        committer.commit(&record("c"), SwipeDirection::Left);

        // Wait for the queue without triggering the on-flush stats push
        let (done_tx, done_rx) = oneshot::channel();
        committer.enqueue(RemoteWrite::Barrier(done_tx));
        done_rx.await.unwrap();

        let summary = store.get("u1", Collection::Stats, STATS_SUMMARY_ID).unwrap();
        assert_eq!(summary["totalSeen"], 2);
        assert_eq!(summary["totalLiked"], 1);

        committer.flush().await;
        let summary = store.get("u1", Collection::Stats, STATS_SUMMARY_ID).unwrap();
        assert_eq!(summary["totalSeen"], 3);
    }

    #[tokio::test]
    async fn test_unavailable_stats_are_never_written() {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            "u1",
            Collection::Stats,
            STATS_SUMMARY_ID,
            serde_json::json!({"totalSeen": 500, "totalLiked": 120}),
        );
        let context = SessionContext {
            stats_unavailable: true,
            ..SessionContext::default()
        };
        let mut committer = DecisionCommitter::spawn(store.clone(), "u1".to_string(), context, 1);

        committer.commit(&record("a"), SwipeDirection::Right);
        committer.close().await;

        // Decisions still land, the stored totals are untouched
        assert!(store.get("u1", Collection::SeenRestaurants, "a").is_some());
        let summary = store.get("u1", Collection::Stats, STATS_SUMMARY_ID).unwrap();
        assert_eq!(summary["totalSeen"], 500);
        assert_eq!(summary["totalLiked"], 120);
        assert_eq!(committer.stats().total_seen, 1);
    }

    #[tokio::test]
    async fn test_unlike_keeps_seen() {
        let store = Arc::new(MemoryStore::new());
        let mut committer = committer(&store);
        committer.commit(&record("a"), SwipeDirection::Right);

        let removed = committer.unlike("a").unwrap();
        assert_eq!(removed.record.id, "a");
        assert!(committer.unlike("a").is_none());
        assert!(committer.seen().contains("a"));

        committer.flush().await;
        assert!(store.get("u1", Collection::LikedRestaurants, "a").is_none());
        assert!(store.get("u1", Collection::SeenRestaurants, "a").is_some());
    }

    #[tokio::test]
    async fn test_reset_progress_keeps_favorites() {
        let store = Arc::new(MemoryStore::new());
        let mut committer = committer(&store);
        committer.commit(&record("a"), SwipeDirection::Right);
        committer.commit(&record("b"), SwipeDirection::Left);

        assert_eq!(committer.reset_progress(), 2);
        assert!(committer.seen().is_empty());
        assert!(committer.liked().contains("a"));

        committer.flush().await;
        assert_eq!(store.count("u1", Collection::SeenRestaurants), 0);
        assert_eq!(store.count("u1", Collection::LikedRestaurants), 1);
    }

    #[tokio::test]
    async fn test_close_drains_queue() {
        let store = Arc::new(MemoryStore::new().with_write_delay(std::time::Duration::from_millis(10)));
        let mut committer = committer(&store);
        for id in ["a", "b", "c"] {
            committer.commit(&record(id), SwipeDirection::Left);
        }

        committer.close().await;
        assert_eq!(store.count("u1", Collection::SeenRestaurants), 3);
        assert!(store.get("u1", Collection::Stats, STATS_SUMMARY_ID).is_some());

        // Commits after close still update local state
        committer.commit(&record("d"), SwipeDirection::Left);
        assert!(committer.seen().contains("d"));
    }
}
