//! The user's active filter selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from filter key to enabled state.
///
/// An empty set, or one where every key is disabled, means "no filtering".
/// Keys are open-ended; the engine looks each one up in its registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    flags: BTreeMap<String, bool>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style enable, for literals in tests and config.
    pub fn with(mut self, key: impl Into<String>) -> Self {
        self.enable(key);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, enabled: bool) {
        self.flags.insert(key.into(), enabled);
    }

    pub fn enable(&mut self, key: impl Into<String>) {
        self.set(key, true);
    }

    pub fn disable(&mut self, key: impl Into<String>) {
        self.set(key, false);
    }

    /// Flip a key and return its new state.
    pub fn toggle(&mut self, key: &str) -> bool {
        let enabled = !self.is_enabled(key);
        self.set(key, enabled);
        enabled
    }

    pub fn is_enabled(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Enabled keys in sorted order.
    pub fn enabled_keys(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(key, _)| key.as_str())
    }

    /// True when nothing is enabled, i.e. every record passes.
    pub fn is_pass_all(&self) -> bool {
        self.enabled_keys().next().is_none()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}

impl<K: Into<String>> FromIterator<K> for FilterSet {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for key in iter {
            set.enable(key);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_all_false_are_pass_all() {
        assert!(FilterSet::new().is_pass_all());

        let mut filters = FilterSet::new();
        filters.disable("openNow");
        filters.disable("italian");
        assert!(filters.is_pass_all());
    }

    #[test]
    fn test_enabled_keys_sorted() {
        let mut filters: FilterSet = ["openNow", "italian"].into_iter().collect();
        filters.disable("vegan");
        let keys: Vec<&str> = filters.enabled_keys().collect();
        assert_eq!(keys, vec!["italian", "openNow"]);
    }

    #[test]
    fn test_toggle() {
        let mut filters = FilterSet::new();
        assert!(filters.toggle("openNow"));
        assert!(filters.is_enabled("openNow"));
        assert!(!filters.toggle("openNow"));
        assert!(filters.is_pass_all());
    }
}
