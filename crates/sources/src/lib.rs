//! # Sources Crate
//!
//! This crate implements the candidate sources that feed the swipe deck.
//!
//! ## Components
//!
//! ### PlacesApiSource (live)
//! Nearby search over HTTP, restricted to restaurants.
//!
//! ### FixtureSource (offline)
//! A stored list of records, radius-filtered around the query point.
//!
//! ### Location resolution
//! `resolve_location` asks a `LocationProvider` and falls back to
//! `DEFAULT_LOCATION` on any failure.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{fetch_candidates, resolve_location, FixtureSource, UnavailableLocation};
//! use sources::{DEFAULT_LOCATION, DEFAULT_RADIUS_METERS};
//! use std::time::Duration;
//!
//! let source = FixtureSource::from_file(Path::new("data/nearby.json"))?;
//! let location = resolve_location(&UnavailableLocation::default(), DEFAULT_LOCATION).await;
//! let candidates =
//!     fetch_candidates(&source, location, DEFAULT_RADIUS_METERS, Duration::from_secs(8)).await;
//! ```

// Public modules
pub mod fetch;
pub mod fixture;
pub mod location;
pub mod places_api;
pub mod types;

// Re-export commonly used types
pub use fetch::{dedup_by_id, fetch_candidates, try_fetch_candidates};
pub use fixture::FixtureSource;
pub use location::{
    resolve_location, FixedLocation, UnavailableLocation, DEFAULT_LOCATION, DEFAULT_RADIUS_METERS,
};
pub use places_api::PlacesApiSource;
pub use types::{CandidateSource, LocationProvider, SourceError};

#[cfg(test)]
mod tests {
    use super::*;
    use records::RestaurantRecord;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fixture_fetch_through_fallback_location() {
        let source = FixtureSource::new(vec![
            RestaurantRecord::new("sf", "Mission Taqueria").with_location(DEFAULT_LOCATION),
        ]);
        let location = resolve_location(&UnavailableLocation::new("denied"), DEFAULT_LOCATION).await;

        let candidates =
            fetch_candidates(&source, location, DEFAULT_RADIUS_METERS, Duration::from_secs(1)).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "sf");
    }

    #[test]
    fn test_source_names() {
        assert_eq!(FixtureSource::new(vec![]).name(), "FixtureSource");
        assert_eq!(PlacesApiSource::new("k").name(), "PlacesApiSource");
    }
}
