//! Places API Source - live nearby search over HTTP
//!
//! Issues a single nearby-search request restricted to `type=restaurant`
//! and hands the body to `records::parser`.

use crate::types::{CandidateSource, SourceError};
use records::{parser, LatLng, RestaurantRecord};
use tracing::{debug, instrument};

/// Default endpoint of the nearby-search service
pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

/// Candidate source backed by the Places nearby-search endpoint
#[derive(Clone)]
pub struct PlacesApiSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PlacesApiSource {
    /// Create a new source using the public endpoint.
    ///
    /// ## Parameters
    /// - `api_key`: Places API key, sent as the `key` query parameter
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_PLACES_URL.to_string(),
        }
    }

    /// Point the source at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl CandidateSource for PlacesApiSource {
    fn name(&self) -> &str {
        "PlacesApiSource"
    }

    #[instrument(skip(self), fields(location = %location.to_query_param()))]
    async fn fetch_nearby(
        &self,
        location: LatLng,
        radius_meters: u32,
    ) -> Result<Vec<RestaurantRecord>, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::NotConfigured("missing Places API key".into()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("location", location.to_query_param()),
                ("radius", radius_meters.to_string()),
                ("type", "restaurant".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let records = parser::parse_nearby_response(&body)?;
        debug!("Places API returned {} restaurants", records.len());
        Ok(records)
    }
}
