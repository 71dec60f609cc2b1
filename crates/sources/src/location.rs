//! Location resolution with a fixed fallback.
//!
//! A denied permission or a failing position lookup must never block the
//! deck: the session falls back to `DEFAULT_LOCATION` instead.

use crate::types::{LocationProvider, SourceError};
use records::LatLng;
use tracing::{debug, warn};

/// Fallback location when the real one is unavailable (San Francisco)
pub const DEFAULT_LOCATION: LatLng = LatLng {
    lat: 37.7749,
    lng: -122.4194,
};

/// Initial search radius in meters
pub const DEFAULT_RADIUS_METERS: u32 = 1500;

/// Provider that always reports the same point.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub LatLng);

impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<LatLng, SourceError> {
        Ok(self.0)
    }
}

/// Provider for hosts without location access (permission denied, no GPS).
#[derive(Debug, Clone, Default)]
pub struct UnavailableLocation {
    pub reason: String,
}

impl UnavailableLocation {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LocationProvider for UnavailableLocation {
    async fn current_location(&self) -> Result<LatLng, SourceError> {
        Err(SourceError::LocationUnavailable(self.reason.clone()))
    }
}

/// Ask the provider for a location, falling back on any failure.
pub async fn resolve_location<L: LocationProvider>(provider: &L, fallback: LatLng) -> LatLng {
    match provider.current_location().await {
        Ok(location) => {
            debug!("Resolved location {}", location.to_query_param());
            location
        }
        Err(e) => {
            warn!(
                "Location unavailable ({}), using fallback {}",
                e,
                fallback.to_query_param()
            );
            fallback
        }
    }
}
