//! Atmosphere filter, approximated from rating and review volume.

use crate::traits::Filter;
use records::RestaurantRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atmosphere {
    /// rating < 4.3
    Casual,
    /// rating >= 4.3 with at least 200 ratings
    Trendy,
    /// rating >= 4.5 with fewer than 100 ratings
    HiddenGem,
}

pub struct AtmosphereFilter {
    atmosphere: Atmosphere,
}

impl AtmosphereFilter {
    pub fn new(atmosphere: Atmosphere) -> Self {
        Self { atmosphere }
    }
}

impl Filter for AtmosphereFilter {
    fn name(&self) -> &str {
        match self.atmosphere {
            Atmosphere::Casual => "AtmosphereFilter(casual)",
            Atmosphere::Trendy => "AtmosphereFilter(trendy)",
            Atmosphere::HiddenGem => "AtmosphereFilter(hidden gem)",
        }
    }

    fn matches(&self, record: &RestaurantRecord) -> bool {
        let Some(rating) = record.rating else {
            return false;
        };
        match self.atmosphere {
            Atmosphere::Casual => rating < 4.3,
            Atmosphere::Trendy => rating >= 4.3 && record.rating_count.is_some_and(|c| c >= 200),
            Atmosphere::HiddenGem => rating >= 4.5 && record.rating_count.is_some_and(|c| c < 100),
        }
    }
}
