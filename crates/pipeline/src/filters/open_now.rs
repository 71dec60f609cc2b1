//! Filter to keep only restaurants that are open right now.

use crate::traits::Filter;
use records::{OpenState, RestaurantRecord};

/// Keeps records whose opening state is known to be open.
///
/// `OpenState::Unknown` is rejected: "open now" is a positive predicate.
pub struct OpenNowFilter;

impl Filter for OpenNowFilter {
    fn name(&self) -> &str {
        "OpenNowFilter"
    }

    fn matches(&self, record: &RestaurantRecord) -> bool {
        record.open_now == OpenState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_now_filter() {
        let filter = OpenNowFilter;
        assert!(filter.matches(&RestaurantRecord::new("1", "Open").with_open_now(true)));
        assert!(!filter.matches(&RestaurantRecord::new("2", "Closed").with_open_now(false)));
        assert!(!filter.matches(&RestaurantRecord::new("3", "Unknown")));
    }
}
