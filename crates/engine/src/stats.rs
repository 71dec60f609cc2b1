//! Decision counters, kept locally and pushed to the store now and then.

use chrono::{DateTime, Utc};
use records::SwipeDirection;
use store::StatsDoc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwipeStats {
    pub total_seen: u64,
    pub total_liked: u64,
}

impl SwipeStats {
    pub fn to_doc(&self, now: DateTime<Utc>) -> StatsDoc {
        StatsDoc {
            total_seen: self.total_seen,
            total_liked: self.total_liked,
            last_updated: Some(now),
        }
    }
}

impl From<StatsDoc> for SwipeStats {
    fn from(doc: StatsDoc) -> Self {
        Self {
            total_seen: doc.total_seen,
            total_liked: doc.total_liked,
        }
    }
}

/// Counts commits and says when the remote summary is due for a refresh.
///
/// The remote copy may lag by up to `flush_every - 1` commits; the counts
/// are informational only.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    stats: SwipeStats,
    flush_every: u32,
    pending: u32,
}

impl StatsAggregator {
    pub fn new(initial: SwipeStats, flush_every: u32) -> Self {
        Self {
            stats: initial,
            flush_every: flush_every.max(1),
            pending: 0,
        }
    }

    /// Record one commit. Returns true when a flush is due.
    pub fn on_commit(&mut self, direction: SwipeDirection) -> bool {
        self.stats.total_seen += 1;
        if direction.is_like() {
            self.stats.total_liked += 1;
        }
        self.pending += 1;
        if self.pending >= self.flush_every {
            self.pending = 0;
            return true;
        }
        false
    }

    /// Whether commits happened since the last flush.
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn mark_flushed(&mut self) {
        self.pending = 0;
    }

    pub fn stats(&self) -> SwipeStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut stats = StatsAggregator::new(SwipeStats::default(), 5);
        stats.on_commit(SwipeDirection::Right);
        stats.on_commit(SwipeDirection::Left);
        stats.on_commit(SwipeDirection::Right);

        assert_eq!(
            stats.stats(),
            SwipeStats {
                total_seen: 3,
                total_liked: 2
            }
        );
    }

    #[test]
    fn test_flush_due_every_n_commits() {
        let mut stats = StatsAggregator::new(SwipeStats::default(), 3);
        let due: Vec<bool> = (0..7).map(|_| stats.on_commit(SwipeDirection::Left)).collect();
        assert_eq!(due, vec![false, false, true, false, false, true, false]);
        assert!(stats.has_pending());

        stats.mark_flushed();
        assert!(!stats.has_pending());
    }

    #[test]
    fn test_continues_from_loaded_totals() {
        let loaded = SwipeStats::from(StatsDoc {
            total_seen: 40,
            total_liked: 12,
            last_updated: None,
        });
        let mut stats = StatsAggregator::new(loaded, 5);
        stats.on_commit(SwipeDirection::Right);

        let doc = stats.stats().to_doc(Utc::now());
        assert_eq!(doc.total_seen, 41);
        assert_eq!(doc.total_liked, 13);
        assert!(doc.last_updated.is_some());
    }
}
