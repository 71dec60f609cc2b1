//! Price tier filter.
//!
//! Candidate records carry no reliable price data, so the tier is
//! approximated from the rating: higher-rated places are assumed to be
//! pricier. This is a known heuristic, kept on purpose.

use crate::traits::Filter;
use records::RestaurantRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    /// rating < 4.0
    Budget,
    /// 4.0 <= rating < 4.5
    Moderate,
    /// rating >= 4.5
    Upscale,
}

impl PriceTier {
    /// Tier implied by a rating.
    pub fn from_rating(rating: f32) -> Self {
        if rating >= 4.5 {
            PriceTier::Upscale
        } else if rating >= 4.0 {
            PriceTier::Moderate
        } else {
            PriceTier::Budget
        }
    }
}

/// Keeps records whose rating-implied tier equals `tier`.
pub struct PriceTierFilter {
    tier: PriceTier,
}

impl PriceTierFilter {
    pub fn new(tier: PriceTier) -> Self {
        Self { tier }
    }
}

impl Filter for PriceTierFilter {
    fn name(&self) -> &str {
        match self.tier {
            PriceTier::Budget => "PriceTierFilter(budget)",
            PriceTier::Moderate => "PriceTierFilter(moderate)",
            PriceTier::Upscale => "PriceTierFilter(upscale)",
        }
    }

    fn matches(&self, record: &RestaurantRecord) -> bool {
        record
            .rating
            .is_some_and(|rating| PriceTier::from_rating(rating) == self.tier)
    }
}
