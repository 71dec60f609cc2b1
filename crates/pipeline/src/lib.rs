//! Filtering of restaurant candidates into a swipe deck.
//!
//! This crate provides:
//! - Filter trait and the predicate implementations
//! - FilterSet, the user's toggled filter keys
//! - FilterEngine, mapping keys to predicates and applying them
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterEngine, FilterSet};
//!
//! let engine = FilterEngine::with_default_catalog();
//! let filters = FilterSet::new().with("rating4Plus").with("openNow");
//! let deck = engine.apply(&candidates, &filters, &seen, false);
//! ```

pub mod filter_pipeline;
pub mod filter_set;
pub mod filters;
pub mod traits;

pub use filter_pipeline::FilterEngine;
pub use filter_set::FilterSet;
pub use filters::catalog::default_keys;
pub use traits::Filter;
