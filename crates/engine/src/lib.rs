//! Swipe-decision engine for nearby restaurant discovery.
//!
//! ## Architecture
//! A [`SwipeSession`] ties the parts together:
//! 1. Candidates come from a `sources::CandidateSource`
//! 2. `pipeline::FilterEngine` narrows them into a deck
//! 3. [`DeckCursor`] tracks the active card
//! 4. [`GestureMachine`] turns drags and button presses into commits
//! 5. [`DecisionCommitter`] records decisions locally and queues remote writes

pub mod committer;
pub mod config;
pub mod context;
pub mod deck;
pub mod gesture;
pub mod session;
pub mod stats;

pub use committer::{DecisionCommitter, RemoteWrite};
pub use config::{ConfigError, EngineConfig};
pub use context::{load_session_context, SessionContext};
pub use deck::{DeckCursor, DeckStatus};
pub use gesture::{
    transition, GestureEvent, GestureMachine, GesturePhase, GesturePosition, GestureState, Transition,
};
pub use session::SwipeSession;
pub use stats::{StatsAggregator, SwipeStats};
