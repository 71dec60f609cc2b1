//! Fixture Source - offline candidate list
//!
//! Serves a fixed set of records, typically loaded from a saved
//! nearby-search payload. Useful for tests, demos and offline hosts.
//!
//! ## Algorithm
//! 1. Keep records whose location lies within the radius of the query point
//! 2. Keep records with no location at all (they cannot be ruled out)
//! 3. Preserve the stored order

use crate::types::{CandidateSource, SourceError};
use records::{parser, LatLng, RestaurantRecord};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct FixtureSource {
    records: Arc<Vec<RestaurantRecord>>,
}

impl FixtureSource {
    pub fn new(records: Vec<RestaurantRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    /// Load records from a nearby-search payload on disk.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        Ok(Self::new(parser::load_fixture(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CandidateSource for FixtureSource {
    fn name(&self) -> &str {
        "FixtureSource"
    }

    async fn fetch_nearby(
        &self,
        location: LatLng,
        radius_meters: u32,
    ) -> Result<Vec<RestaurantRecord>, SourceError> {
        let radius = f64::from(radius_meters);
        let nearby: Vec<RestaurantRecord> = self
            .records
            .iter()
            .filter(|record| match record.location {
                Some(at) => at.distance_meters(&location) <= radius,
                None => true,
            })
            .cloned()
            .collect();

        debug!(
            "FixtureSource: {} of {} records within {}m",
            nearby.len(),
            self.records.len(),
            radius_meters
        );
        Ok(nearby)
    }
}
