//! Discord message handling.
//!
//! Converts gateway messages into [`NotificationPayload`]s, feeds them to the
//! agent, and posts the agent's commands back through the REST API.

use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::{Embed, Message};
use serenity::model::id::{ChannelId, MessageId};
use tracing::{debug, error};

use crate::agent::{Agent, Outcome};
use crate::common::error::{DiscordError, DiscordResult};
use crate::common::NotificationPayload;
use crate::game::CommandSink;

/// Both directions of the chat transport, as seen by the worker.
#[async_trait]
pub trait Transport: CommandSink {
    /// Re-read the message behind `payload`, picking up edits made since it was posted.
    async fn refresh(&self, payload: &mut NotificationPayload) -> DiscordResult<()>;
}

/// REST-backed transport.
pub struct DiscordTransport {
    http: Arc<Http>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CommandSink for DiscordTransport {
    async fn send(&self, channel_id: u64, text: &str) -> DiscordResult<()> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| DiscordError::SendFailed {
                channel_id,
                command: text.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn refresh(&self, payload: &mut NotificationPayload) -> DiscordResult<()> {
        let current = ChannelId::new(payload.channel_id)
            .message(&self.http, MessageId::new(payload.message_id))
            .await?;
        refresh_payload(payload, &current);
        Ok(())
    }
}

/// Handle one inbound notification.
///
/// Returns `None` when the message never reached the agent's pipeline
/// because re-fetching it failed.
pub async fn handle_message(
    agent: &mut Agent,
    transport: &dyn Transport,
    mut payload: NotificationPayload,
) -> Option<Outcome> {
    // Filter before the REST round trip; most guild traffic is not ours.
    if let Err(reason) = agent.check(&payload) {
        return Some(Outcome::Rejected(reason));
    }

    // The game bot edits its embeds after posting, so read the current version.
    if let Err(e) = transport.refresh(&mut payload).await {
        error!("Error getting message {}: {}", payload.message_id, e);
        return None;
    }

    let outcome = agent.handle(&payload, transport).await;
    debug!(message_id = payload.message_id, ?outcome, "Message handled");
    Some(outcome)
}

/// Build a payload from a gateway message. REST copies lack the guild id,
/// so identifiers always come from here.
pub fn to_payload(msg: &Message) -> NotificationPayload {
    let mut payload = NotificationPayload {
        author_id: msg.author.id.get(),
        guild_id: msg.guild_id.map(|id| id.get()),
        channel_id: msg.channel_id.get(),
        message_id: msg.id.get(),
        ..Default::default()
    };
    refresh_payload(&mut payload, msg);
    payload
}

/// Copy body and first-embed text from `msg` onto `payload`.
fn refresh_payload(payload: &mut NotificationPayload, msg: &Message) {
    payload.content = msg.content.clone();
    let (has_embed, title, description) = first_embed_text(&msg.embeds);
    payload.has_embed = has_embed;
    payload.embed_title = title;
    payload.embed_description = description;
}

fn first_embed_text(embeds: &[Embed]) -> (bool, Option<String>, Option<String>) {
    match embeds.first() {
        Some(embed) => (true, embed.title.clone(), embed.description.clone()),
        None => (false, None, None),
    }
}
