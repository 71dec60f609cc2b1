//! Filter on what a restaurant serves (cuisine, meal time, dietary).
//!
//! Sources tag places with types like `italian_restaurant` or `cafe`, but
//! coverage is patchy, so the name is checked for keywords as well.

use crate::traits::Filter;
use records::RestaurantRecord;

/// Keeps records carrying any of `tags`, or whose name contains any of `keywords`.
///
/// ## Algorithm
/// 1. Exact match of any category tag
/// 2. Otherwise a case-insensitive substring match of any keyword in the name
/// 3. A record with no tags and no keyword in its name is rejected
pub struct CategoryFilter {
    name: String,
    tags: Vec<String>,
    keywords: Vec<String>,
}

impl CategoryFilter {
    /// Create a new CategoryFilter.
    ///
    /// # Arguments
    /// * `name` - Label used in logs
    /// * `tags` - Place types that qualify, e.g. `["mexican_restaurant"]`
    /// * `keywords` - Lowercased words looked for in the restaurant name
    pub fn new(name: impl Into<String>, tags: &[&str], keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Cuisine shorthand: `<cuisine>_restaurant` tag plus the cuisine as a name keyword.
    pub fn cuisine(cuisine: &str, extra_keywords: &[&str]) -> Self {
        let tag = format!("{cuisine}_restaurant");
        let mut filter = Self::new(format!("CuisineFilter({cuisine})"), &[tag.as_str()], extra_keywords);
        filter.keywords.push(cuisine.to_lowercase());
        filter
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, record: &RestaurantRecord) -> bool {
        if self.tags.iter().any(|tag| record.has_tag(tag)) {
            return true;
        }
        if self.keywords.is_empty() {
            return false;
        }
        let name = record.name.to_lowercase();
        self.keywords.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_match() {
        let filter = CategoryFilter::cuisine("italian", &["trattoria"]);
        let tagged = RestaurantRecord::new("1", "Luigi's").with_tags(["italian_restaurant"]);
        assert!(filter.matches(&tagged));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let filter = CategoryFilter::cuisine("italian", &["trattoria"]);
        assert!(filter.matches(&RestaurantRecord::new("2", "Trattoria Roma")));
        assert!(filter.matches(&RestaurantRecord::new("3", "Best ITALIAN Food")));
    }

    #[test]
    fn test_no_tags_no_keyword_rejects() {
        let filter = CategoryFilter::new("Breakfast", &["cafe", "bakery"], &[]);
        assert!(!filter.matches(&RestaurantRecord::new("4", "Cafe Without Tags")));
        assert!(filter.matches(&RestaurantRecord::new("5", "Bean There").with_tags(["cafe"])));
    }
}
