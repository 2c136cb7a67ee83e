//! The automation agent.
//!
//! ## Module Structure
//!
//! - `filter`: Guild/author gate for inbound notifications
//! - `orchestrator`: Per-notification pipeline (`Agent` struct)

pub mod filter;
pub mod orchestrator;

pub use filter::InboundFilter;
pub use orchestrator::{Agent, Outcome};
