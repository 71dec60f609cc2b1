//! Filter implementations for the restaurant deck.
//!
//! Each filter is a pure predicate over one record. The `catalog` module
//! wires them to the filter keys a user can toggle.

pub mod atmosphere;
pub mod catalog;
pub mod category;
pub mod minimum_rating;
pub mod open_now;
pub mod price_tier;

pub use atmosphere::{Atmosphere, AtmosphereFilter};
pub use category::CategoryFilter;
pub use minimum_rating::MinimumRatingFilter;
pub use open_now::OpenNowFilter;
pub use price_tier::{PriceTier, PriceTierFilter};
