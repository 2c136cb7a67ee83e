//! Discord bot integration.
//!
//! This module connects the agent to the Discord gateway and REST API.

pub mod client;
pub mod handler;

// Re-export main types for external use
pub use client::{DiscordBotBuilder, DiscordChannels};
