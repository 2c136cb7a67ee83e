//! Game progression logic.
//!
//! This module contains:
//! - Embed text sanitizing
//! - Progress counters
//! - Rule-based classification of game bot notifications
//! - Dispatch of follow-up commands, including the stamina cooldown

pub mod backoff;
pub mod classifier;
pub mod dispatcher;
pub mod sanitize;
pub mod state;

// Re-export commonly used types
pub use backoff::BackoffController;
pub use classifier::{classify, SemanticEvent};
pub use dispatcher::{ActionDispatcher, CommandSink, Flow};
pub use state::GameState;
