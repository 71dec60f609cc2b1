//! The FilterEngine maps filter keys to predicates and narrows candidate lists.

use crate::filter_set::FilterSet;
use crate::filters::catalog;
use crate::traits::Filter;
use rayon::prelude::*;
use records::{RestaurantRecord, SeenSet};
use std::collections::BTreeMap;

/// Registry of keyed predicates.
///
/// ## Usage
/// ```ignore
/// let engine = FilterEngine::new()
///     .register("openNow", OpenNowFilter)
///     .register("rating4Plus", MinimumRatingFilter::new(4.0, 0));
///
/// let deck = engine.apply(&candidates, &filters, &seen, false);
/// ```
pub struct FilterEngine {
    filters: BTreeMap<String, Box<dyn Filter>>,
}

impl FilterEngine {
    /// Create an engine with no predicates registered.
    pub fn new() -> Self {
        Self {
            filters: BTreeMap::new(),
        }
    }

    /// Engine preloaded with every key in [`catalog::default_keys`].
    pub fn with_default_catalog() -> Self {
        catalog::register_defaults(Self::new())
    }

    /// Register (or replace) the predicate behind `key` (builder pattern).
    pub fn register(mut self, key: impl Into<String>, filter: impl Filter + 'static) -> Self {
        self.filters.insert(key.into(), Box::new(filter));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.filters.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Narrow `records` to the ones that satisfy every enabled filter.
    ///
    /// ## Algorithm
    /// 1. Resolve enabled keys to predicates, skipping keys with none registered
    /// 2. Drop records in `seen` unless `include_seen`
    /// 3. Keep records matching all resolved predicates (none resolved keeps all)
    ///
    /// Output order equals input order. The function is pure: same inputs,
    /// same output.
    pub fn apply(
        &self,
        records: &[RestaurantRecord],
        filters: &FilterSet,
        seen: &SeenSet,
        include_seen: bool,
    ) -> Vec<RestaurantRecord> {
        let active: Vec<&dyn Filter> = filters
            .enabled_keys()
            .into_iter()
            .filter_map(|key| match self.filters.get(key) {
                Some(filter) => Some(&**filter),
                None => {
                    tracing::debug!("Ignoring unknown filter key: {}", key);
                    None
                }
            })
            .collect();

        tracing::debug!(
            "Applying {} filter(s) to {} record(s) (include_seen: {})",
            active.len(),
            records.len(),
            include_seen
        );

        let kept: Vec<RestaurantRecord> = records
            .par_iter()
            .filter(|record| include_seen || !seen.contains(&record.id))
            .filter(|record| active.iter().all(|filter| filter.matches(record)))
            .cloned()
            .collect();

        tracing::debug!("Filtering kept {} of {} record(s)", kept.len(), records.len());
        kept
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{MinimumRatingFilter, OpenNowFilter};

    fn ids(records: &[RestaurantRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_set_passes_all() {
        let engine = FilterEngine::new().register("openNow", OpenNowFilter);
        let records = vec![
            RestaurantRecord::new("a", "A"),
            RestaurantRecord::new("b", "B").with_open_now(false),
        ];
        let out = engine.apply(&records, &FilterSet::new(), &SeenSet::new(), false);
        assert_eq!(ids(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let engine = FilterEngine::new().register("rating4Plus", MinimumRatingFilter::new(4.0, 0));
        let records = vec![
            RestaurantRecord::new("a", "A").with_rating(4.2, 10),
            RestaurantRecord::new("b", "B").with_rating(3.2, 10),
        ];
        let filters = FilterSet::new().with("rating4Plus").with("doesNotExist");
        let out = engine.apply(&records, &filters, &SeenSet::new(), false);
        assert_eq!(ids(&out), vec!["a"]);
    }

    #[test]
    fn test_disabled_key_has_no_effect() {
        let engine = FilterEngine::new().register("openNow", OpenNowFilter);
        let records = vec![RestaurantRecord::new("a", "A").with_open_now(false)];
        let mut filters = FilterSet::new();
        filters.set("openNow", false);
        let out = engine.apply(&records, &filters, &SeenSet::new(), false);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_keys_sorted() {
        let engine = FilterEngine::new()
            .register("openNow", OpenNowFilter)
            .register("rating4Plus", MinimumRatingFilter::new(4.0, 0));
        assert_eq!(engine.keys().collect::<Vec<_>>(), vec!["openNow", "rating4Plus"]);
    }
}
