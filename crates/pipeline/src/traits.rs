//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait: a single named predicate over a
//! restaurant record. The engine combines every enabled predicate with AND.

use records::RestaurantRecord;

/// Core trait for filtering restaurant records.
///
/// ## Design Note
/// - `Send + Sync` allows predicates to be evaluated from rayon workers
/// - Predicates never fail: a missing optional field means "does not match"
///   for a positive predicate, never an error
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `record` satisfies this predicate.
    fn matches(&self, record: &RestaurantRecord) -> bool;
}
