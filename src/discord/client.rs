//! Discord bot client abstraction.
//!
//! Provides a high-level interface for creating and running the Discord bot,
//! hiding serenity implementation details from the rest of the application.
//!
//! Gateway callbacks only forward events into a queue. A single worker
//! drains that queue in arrival order and is the sole owner of the [`Agent`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backon::BackoffBuilder;
use serenity::async_trait;
use serenity::gateway::GatewayError;
use serenity::http::HttpBuilder;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::agent::{Agent, Outcome};
use crate::common::error::{DiscordError, DiscordResult};
use crate::common::{ConsoleCommand, NotificationPayload};
use crate::discord::handler::{self, DiscordTransport, Transport};

pub enum DiscordBotEvent {
    /// Bot connected and ready.
    Ready { user_id: u64, name: String },
    /// Message received, with the transport to answer it on.
    Message {
        payload: NotificationPayload,
        transport: Arc<dyn Transport>,
    },
    Disconnected,
}

struct DiscordBotEvents {
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
    /// Set once the gateway has accepted us at least once.
    connected: Arc<AtomicBool>,
}

impl DiscordBotEvents {
    fn new(
        discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            discord_events_tx,
            connected,
        }
    }
}

#[async_trait]
impl EventHandler for DiscordBotEvents {
    async fn ready(&self, _context: Context, ready: Ready) {
        self.connected.store(true, Ordering::SeqCst);
        let event = DiscordBotEvent::Ready {
            user_id: ready.user.id.get(),
            name: ready.user.name.clone(),
        };
        if let Err(error) = self.discord_events_tx.send(event) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    async fn message(&self, context: Context, message: Message) {
        let event = DiscordBotEvent::Message {
            payload: handler::to_payload(&message),
            transport: Arc::new(DiscordTransport::new(context.http.clone())),
        };
        if let Err(error) = self.discord_events_tx.send(event) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

/// Channels for Discord bot communication.
pub struct DiscordChannels {
    /// Receiver for console commands.
    pub console_rx: mpsc::UnboundedReceiver<ConsoleCommand>,
    /// Receiver for shutdown signal.
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Builder for creating the Discord bot.
pub struct DiscordBotBuilder {
    token: String,
    agent: Agent,
    channels: DiscordChannels,
}

impl DiscordBotBuilder {
    /// Create a new Discord bot builder.
    pub fn new(token: String, agent: Agent, channels: DiscordChannels) -> Self {
        Self {
            token,
            agent,
            channels,
        }
    }

    /// Build the Discord bot.
    pub async fn build(self) -> anyhow::Result<DiscordBot> {
        let (discord_events_tx, discord_events_rx) = mpsc::unbounded_channel::<DiscordBotEvent>();

        let connected = Arc::new(AtomicBool::new(false));
        let client = build_client(&self.token, discord_events_tx.clone(), connected.clone()).await?;

        Ok(DiscordBot {
            client: Some(client),
            token: self.token,
            connected,
            agent: self.agent,
            discord_events_rx,
            discord_events_tx,
            console_rx: self.channels.console_rx,
            shutdown_rx: self.channels.shutdown_rx,
        })
    }
}

async fn build_client(
    token: &str,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
    connected: Arc<AtomicBool>,
) -> anyhow::Result<Client> {
    let intents =
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILDS;

    // Build a custom reqwest client with timeout settings
    let reqwest_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let http = HttpBuilder::new(token).client(reqwest_client).build();

    let events = DiscordBotEvents::new(discord_events_tx, connected);
    let client = serenity::client::ClientBuilder::new_with_http(http, intents)
        .event_handler(events)
        .await?;
    Ok(client)
}

pub struct DiscordBot {
    client: Option<Client>,
    token: String,
    connected: Arc<AtomicBool>,
    agent: Agent,
    discord_events_rx: mpsc::UnboundedReceiver<DiscordBotEvent>,
    discord_events_tx: mpsc::UnboundedSender<DiscordBotEvent>,
    console_rx: mpsc::UnboundedReceiver<ConsoleCommand>,
    shutdown_rx: watch::Receiver<bool>,
}

impl DiscordBot {
    /// Run until shutdown. Fails only when the session cannot be opened.
    pub async fn run(mut self) -> DiscordResult<()> {
        let shard_manager = self.client.as_ref().map(|c| c.shard_manager.clone());
        let client = &mut self.client;
        let discord_events_rx = &mut self.discord_events_rx;
        let agent = &mut self.agent;
        let console_rx = &mut self.console_rx;
        let mut shutdown_rx = self.shutdown_rx.clone();

        let result = tokio::select! {
            result = Self::run_connection(client, &self.token, &self.connected, &self.discord_events_tx) => result,
            _ = Self::process_events(discord_events_rx, agent, console_rx, &mut self.shutdown_rx) => Ok(()),
            _ = async {
                loop {
                    if shutdown_rx.changed().await.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                if let Some(ref manager) = shard_manager {
                    info!("Initiating graceful Discord shutdown...");
                    manager.shutdown_all().await;
                    info!("Discord shutdown complete");
                }
            } => Ok(()),
        };
        info!("Discord task ended");
        result
    }

    async fn run_connection(
        client: &mut Option<Client>,
        token: &str,
        connected: &Arc<AtomicBool>,
        discord_events_tx: &mpsc::UnboundedSender<DiscordBotEvent>,
    ) -> DiscordResult<()> {
        /// Create an exponential backoff iterator for Discord reconnection.
        /// 5s initial, 5min max, factor 1.1, with jitter, unlimited retries.
        fn discord_backoff() -> impl Iterator<Item = Duration> {
            backon::ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(5))
                .with_max_delay(MAX_RECONNECT_DELAY)
                .with_factor(1.1)
                .with_jitter()
                .without_max_times()
                .build()
        }

        let mut backoff = discord_backoff();

        loop {
            info!("Connecting to Discord...");

            let mut client = match client.take() {
                Some(client) => client,
                None => match build_client(token, discord_events_tx.clone(), connected.clone()).await {
                    Ok(client) => {
                        backoff = discord_backoff();
                        client
                    }
                    Err(e) => {
                        error!("Failed to rebuild Discord client: {}", e);
                        let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                        warn!("Retrying in {:.1}s...", delay.as_secs_f64());
                        sleep(delay).await;
                        continue;
                    }
                },
            };

            match client.start().await {
                Ok(()) => {
                    info!("Discord client disconnected normally");
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    return Ok(());
                }
                Err(e) => {
                    error!("Discord client error: {}", e);
                    if is_fatal(&e, connected.load(Ordering::SeqCst)) {
                        return Err(DiscordError::SessionOpenFailed {
                            message: e.to_string(),
                        });
                    }
                    let delay = backoff.next().unwrap_or(MAX_RECONNECT_DELAY);
                    warn!(
                        "Discord disconnected. Reconnecting in {:.1}s...",
                        delay.as_secs_f64(),
                    );
                    if let Err(error) = discord_events_tx.send(DiscordBotEvent::Disconnected) {
                        warn!("Failed to process discord event: {}", error);
                    }
                    sleep(delay).await;
                }
            }
        }
    }

    async fn process_events(
        discord_events_rx: &mut mpsc::UnboundedReceiver<DiscordBotEvent>,
        agent: &mut Agent,
        console_rx: &mut mpsc::UnboundedReceiver<ConsoleCommand>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                event = discord_events_rx.recv() => {
                    match event {
                        Some(DiscordBotEvent::Message { payload, transport }) => {
                            let outcome = handler::handle_message(agent, transport.as_ref(), payload).await;
                            if let Some(Outcome::Handled { cooled_down: true, .. }) = outcome {
                                Self::discard_stale(discord_events_rx, agent);
                            }
                        }
                        Some(event) => Self::apply_connection_event(agent, event),
                        None => {
                            debug!("Discord events channel closed.");
                            break;
                        }
                    }
                }

                // Disabled for this round once the console has gone away
                Some(command) = console_rx.recv() => agent.handle_console(command),

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping event processing");
                        break;
                    }
                }
            }
        }
    }

    fn apply_connection_event(agent: &mut Agent, event: DiscordBotEvent) {
        match event {
            DiscordBotEvent::Ready { user_id, name } => {
                info!("Discord bot connected as {}", name);
                agent.set_own_user_id(user_id);
            }
            DiscordBotEvent::Disconnected => debug!("Discord connection lost"),
            DiscordBotEvent::Message { .. } => {}
        }
    }

    /// Drop messages that queued up while the stamina cooldown was running.
    /// They describe game screens that are long gone.
    fn discard_stale(
        discord_events_rx: &mut mpsc::UnboundedReceiver<DiscordBotEvent>,
        agent: &mut Agent,
    ) {
        let mut discarded = 0;
        while let Ok(event) = discord_events_rx.try_recv() {
            match event {
                DiscordBotEvent::Message { .. } => discarded += 1,
                event => Self::apply_connection_event(agent, event),
            }
        }
        if discarded > 0 {
            info!("Discarded {} messages received during the stamina cooldown", discarded);
        }
    }
}

const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(5 * 60);

/// Whether a failed connection should end the process rather than be retried.
///
/// Rejected credentials never recover, and a session that never got as far as
/// ready has nothing to reconnect to.
fn is_fatal(error: &serenity::Error, ever_connected: bool) -> bool {
    !ever_connected || is_auth_failure(error)
}

fn is_auth_failure(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => true,
        serenity::Error::Http(e) => e.status_code().map(|s| s.as_u16()) == Some(401),
        _ => false,
    }
}
