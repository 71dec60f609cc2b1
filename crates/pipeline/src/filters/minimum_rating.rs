//! Filter to ensure a minimum quality threshold.
//!
//! Removes restaurants with low average ratings or too few ratings.

use crate::traits::Filter;
use records::RestaurantRecord;

/// Keeps records rated at least `min_rating` by at least `min_count` people.
///
/// ## Algorithm
/// For each record:
/// 1. Reject if the rating is unknown
/// 2. Check rating >= min_rating
/// 3. If min_count > 0, check rating_count >= min_count (unknown count rejects)
pub struct MinimumRatingFilter {
    name: String,
    min_rating: f32,
    min_count: u32,
}

impl MinimumRatingFilter {
    /// Create a new MinimumRatingFilter.
    ///
    /// # Arguments
    /// * `min_rating` - Minimum average rating (typically 4.0)
    /// * `min_count` - Minimum number of ratings, 0 to ignore the count
    pub fn new(min_rating: f32, min_count: u32) -> Self {
        Self {
            name: format!("MinimumRatingFilter({min_rating}+)"),
            min_rating,
            min_count,
        }
    }
}

impl Filter for MinimumRatingFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, record: &RestaurantRecord) -> bool {
        let Some(rating) = record.rating else {
            return false;
        };
        if rating < self.min_rating {
            return false;
        }
        if self.min_count == 0 {
            return true;
        }
        record
            .rating_count
            .is_some_and(|count| count >= self.min_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_rating_filter() {
        let filter = MinimumRatingFilter::new(4.0, 0);

        assert!(filter.matches(&RestaurantRecord::new("1", "Great").with_rating(4.5, 3)));
        assert!(filter.matches(&RestaurantRecord::new("2", "Exactly").with_rating(4.0, 3)));
        assert!(!filter.matches(&RestaurantRecord::new("3", "Meh").with_rating(3.9, 300)));
        // Unknown rating never satisfies a positive predicate
        assert!(!filter.matches(&RestaurantRecord::new("4", "Unrated")));
    }

    #[test]
    fn test_minimum_count() {
        let filter = MinimumRatingFilter::new(4.0, 10);

        assert!(filter.matches(&RestaurantRecord::new("1", "Popular").with_rating(4.2, 50)));
        assert!(!filter.matches(&RestaurantRecord::new("2", "Few Ratings").with_rating(4.8, 5)));

        let mut no_count = RestaurantRecord::new("3", "No Count");
        no_count.rating = Some(4.9);
        assert!(!filter.matches(&no_count));
    }
}
