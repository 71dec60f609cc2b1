//! Core traits and errors shared by all candidate sources.

use records::{LatLng, RestaurantRecord};
use std::future::Future;
use thiserror::Error;

/// Errors a source or location provider can report.
///
/// None of these are fatal to a session: callers degrade to a fallback
/// location or an empty candidate list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid payload: {0}")]
    Payload(#[from] records::RecordError),

    #[error("Source not configured: {0}")]
    NotConfigured(String),
}

/// Supplies the raw, unfiltered list of restaurants around a location.
///
/// ## Design Note
/// - `Send + Sync` so a session can be driven from any tokio task
/// - Returned futures are `Send` so fetches can be wrapped in timeouts
pub trait CandidateSource: Send + Sync {
    /// Returns the name of this source (for logging/debugging)
    fn name(&self) -> &str;

    /// Fetch restaurants within `radius_meters` of `location`.
    fn fetch_nearby(
        &self,
        location: LatLng,
        radius_meters: u32,
    ) -> impl Future<Output = Result<Vec<RestaurantRecord>, SourceError>> + Send;
}

/// Reports where the user currently is.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> impl Future<Output = Result<LatLng, SourceError>> + Send;
}
