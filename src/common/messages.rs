//! Canonical message types passed between the transport, the agent and the console.

use tokio::sync::oneshot;

/// An inbound notification from the chat platform.
///
/// Only the first embed of a message is ever inspected, so its title and
/// description are flattened onto the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPayload {
    pub author_id: u64,
    /// None for direct messages.
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    /// Plain message body.
    pub content: String,
    /// Whether the message carried at least one embed.
    pub has_embed: bool,
    pub embed_title: Option<String>,
    pub embed_description: Option<String>,
}

impl NotificationPayload {
    /// Title of the first embed, empty when absent.
    pub fn title(&self) -> &str {
        self.embed_title.as_deref().unwrap_or("")
    }

    /// Description of the first embed, empty when absent.
    pub fn description(&self) -> &str {
        self.embed_description.as_deref().unwrap_or("")
    }
}

/// Point-in-time copy of the progress counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub location: u32,
    pub floor: u32,
}

/// Commands typed on the local console.
#[derive(Debug)]
pub enum ConsoleCommand {
    /// Resume reacting to notifications.
    Start,
    /// Keep receiving notifications but stop reacting to them.
    Pause,
    /// Report current progress.
    Status { reply: oneshot::Sender<ProgressSnapshot> },
}
