//! # Records Crate
//!
//! Data model shared by every crate in the swipe-deck workspace.
//!
//! ## Main Components
//!
//! - **types**: `RestaurantRecord`, `SwipeDirection`, `SeenSet`, `LikedSet`
//! - **parser**: Parse Places nearby-search payloads into records
//! - **error**: Error types for payload loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use records::parser;
//! use std::path::Path;
//!
//! let records = parser::load_fixture(Path::new("data/nearby.json"))?;
//! println!("Loaded {} restaurants", records.len());
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{RecordError, Result};
pub use types::{
    LatLng, LikedEntry, LikedSet, OpenState, RestaurantId, RestaurantRecord, SeenSet,
    SwipeDirection, UserId,
};
