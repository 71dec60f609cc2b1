//! Session preload: the user's seen set, favorites and stats.

use crate::stats::SwipeStats;
use records::{LikedEntry, LikedSet, SeenSet};
use std::time::Duration;
use store::documents::from_document;
use store::{Collection, Document, LikedDoc, PersistencePort, StatsDoc, STATS_SUMMARY_ID};
use tracing::{info, instrument, warn};

/// Local state a session starts from.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub seen: SeenSet,
    pub liked: LikedSet,
    pub stats: SwipeStats,
    /// The stats read failed, so `stats` is not the stored total and must
    /// not be written back over it.
    pub stats_unavailable: bool,
}

/// Read the three collections concurrently, each bounded by `timeout`.
///
/// A failed or timed-out read leaves that part empty; the session then
/// treats everything as unseen rather than blocking. A missing stats summary
/// is a fresh start, a failed read is flagged with `stats_unavailable`.
#[instrument(skip(store))]
pub async fn load_session_context<P: PersistencePort>(
    store: &P,
    user: &str,
    timeout: Duration,
) -> SessionContext {
    let (seen_docs, liked_docs, stats_docs) = tokio::join!(
        read_collection(store, user, Collection::SeenRestaurants, timeout),
        read_collection(store, user, Collection::LikedRestaurants, timeout),
        read_collection(store, user, Collection::Stats, timeout),
    );

    let seen: SeenSet = seen_docs.unwrap_or_default().into_iter().map(|(id, _)| id).collect();

    let liked: LikedSet = liked_docs
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, doc)| {
            match from_document::<LikedDoc>(Collection::LikedRestaurants, &id, doc) {
                Ok(doc) => Some(LikedEntry::from(doc)),
                Err(e) => {
                    warn!("Skipping unreadable favorite: {}", e);
                    None
                }
            }
        })
        .collect();

    let mut stats_unavailable = stats_docs.is_none();
    let stats = stats_docs
        .unwrap_or_default()
        .into_iter()
        .find(|(id, _)| id == STATS_SUMMARY_ID)
        .and_then(|(id, doc)| match from_document::<StatsDoc>(Collection::Stats, &id, doc) {
            Ok(doc) => Some(SwipeStats::from(doc)),
            Err(e) => {
                warn!("Ignoring unreadable stats summary: {}", e);
                stats_unavailable = true;
                None
            }
        })
        .unwrap_or_default();

    info!(
        "Loaded session context: {} seen, {} liked, {} total swipes",
        seen.len(),
        liked.len(),
        stats.total_seen
    );

    SessionContext {
        seen,
        liked,
        stats,
        stats_unavailable,
    }
}

async fn read_collection<P: PersistencePort>(
    store: &P,
    user: &str,
    collection: Collection,
    timeout: Duration,
) -> Option<Vec<(String, Document)>> {
    match tokio::time::timeout(timeout, store.read_all(user, collection)).await {
        Ok(Ok(docs)) => Some(docs),
        Ok(Err(e)) => {
            warn!("Failed to load {}, starting empty: {}", collection, e);
            None
        }
        Err(_) => {
            warn!("Loading {} timed out after {:?}, starting empty", collection, timeout);
            None
        }
    }
}
