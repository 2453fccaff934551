pub mod engine;
pub mod error;
pub mod state;
pub mod store;

pub use engine::{CompanionEngine, InteractionOutcome};
pub use error::{CompanionError, Result};
pub use state::{Action, CompanionState, Mood, Personality, DEFAULT_DECAY_RATE};
pub use store::{SqliteStore, StateStore};
