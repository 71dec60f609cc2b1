//! Timeout-bounded candidate fetching.
//!
//! Network fetches have no natural deadline, so every fetch made on behalf of
//! a session goes through `try_fetch_candidates`, which reports errors and
//! timeouts as `None`, or `fetch_candidates`, which turns them into an empty
//! list.

use crate::types::CandidateSource;
use records::{LatLng, RestaurantId, RestaurantRecord};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Fetch candidates, degrading to an empty list on failure or timeout.
///
/// Duplicate ids are dropped (first occurrence wins) so the batch keeps the
/// "ids are unique" invariant even if a source misbehaves.
pub async fn fetch_candidates<S: CandidateSource>(
    source: &S,
    location: LatLng,
    radius_meters: u32,
    timeout: Duration,
) -> Vec<RestaurantRecord> {
    try_fetch_candidates(source, location, radius_meters, timeout)
        .await
        .unwrap_or_default()
}

/// Like `fetch_candidates`, but reports failure or timeout as `None` so a
/// caller holding an earlier batch can keep it.
#[instrument(skip(source), fields(source = source.name()))]
pub async fn try_fetch_candidates<S: CandidateSource>(
    source: &S,
    location: LatLng,
    radius_meters: u32,
    timeout: Duration,
) -> Option<Vec<RestaurantRecord>> {
    let start = Instant::now();

    let records = match tokio::time::timeout(timeout, source.fetch_nearby(location, radius_meters)).await {
        Ok(Ok(records)) => records,
        Ok(Err(e)) => {
            warn!("Candidate fetch failed: {}", e);
            return None;
        }
        Err(_) => {
            warn!("Candidate fetch timed out after {:?}", timeout);
            return None;
        }
    };

    let fetched = records.len();
    let unique = dedup_by_id(records);
    info!(
        "Fetched {} candidates ({} unique) within {}m in {:.2?}",
        fetched,
        unique.len(),
        radius_meters,
        start.elapsed()
    );
    Some(unique)
}

/// Drop repeated ids while keeping the first occurrence and the input order.
pub fn dedup_by_id(records: Vec<RestaurantRecord>) -> Vec<RestaurantRecord> {
    let mut seen: HashSet<RestaurantId> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceError;

    struct SlowSource;

    impl CandidateSource for SlowSource {
        fn name(&self) -> &str {
            "SlowSource"
        }

        async fn fetch_nearby(
            &self,
            _location: LatLng,
            _radius_meters: u32,
        ) -> Result<Vec<RestaurantRecord>, SourceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![RestaurantRecord::new("late", "Too Late")])
        }
    }

    struct FailingSource;

    impl CandidateSource for FailingSource {
        fn name(&self) -> &str {
            "FailingSource"
        }

        async fn fetch_nearby(
            &self,
            _location: LatLng,
            _radius_meters: u32,
        ) -> Result<Vec<RestaurantRecord>, SourceError> {
            Err(SourceError::NotConfigured("offline".into()))
        }
    }

    struct DuplicatingSource;

    impl CandidateSource for DuplicatingSource {
        fn name(&self) -> &str {
            "DuplicatingSource"
        }

        async fn fetch_nearby(
            &self,
            _location: LatLng,
            _radius_meters: u32,
        ) -> Result<Vec<RestaurantRecord>, SourceError> {
            Ok(vec![
                RestaurantRecord::new("a", "First A"),
                RestaurantRecord::new("b", "B"),
                RestaurantRecord::new("a", "Second A"),
            ])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_degrades_to_empty() {
        let records = fetch_candidates(
            &SlowSource,
            LatLng::new(0.0, 0.0),
            1500,
            Duration::from_secs(5),
        )
        .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_error_degrades_to_empty() {
        let records = fetch_candidates(
            &FailingSource,
            LatLng::new(0.0, 0.0),
            1500,
            Duration::from_secs(5),
        )
        .await;
        assert!(records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_fetch_distinguishes_failure_from_empty() {
        let here = LatLng::new(0.0, 0.0);
        let timeout = Duration::from_secs(5);

        assert!(try_fetch_candidates(&FailingSource, here, 1500, timeout).await.is_none());
        assert!(try_fetch_candidates(&SlowSource, here, 1500, timeout).await.is_none());

        let records = try_fetch_candidates(&DuplicatingSource, here, 1500, timeout).await;
        assert_eq!(records.map(|r| r.len()), Some(2));
    }

    #[tokio::test]
    async fn test_duplicates_are_dropped() {
        let records = fetch_candidates(
            &DuplicatingSource,
            LatLng::new(0.0, 0.0),
            1500,
            Duration::from_secs(5),
        )
        .await;
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First A", "B"]);
    }
}
