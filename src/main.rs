//! Anigrind - self-driving floor climber for the Anigame Discord bot
//!
//! Watches the game bot's embeds in allowed guilds and answers them with
//! the next command (battle, next floor, next location), waiting out
//! stamina cooldowns along the way.

mod agent;
mod common;
mod config;
mod console;
mod discord;
mod game;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use agent::Agent;
use common::error::{AppError, DiscordError};
use common::ConsoleCommand;
use config::{env::get_config_path, load_and_validate};
use discord::{DiscordBotBuilder, DiscordChannels};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Anigrind v{} starting...", env!("CARGO_PKG_VERSION"));

    run().await.map_err(|e| {
        error!("Fatal: {}", e);
        e.into()
    })
}

/// Everything between logging setup and exit. Errors returned here are fatal.
async fn run() -> common::error::Result<()> {
    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        AppError::from(e)
    })?;

    info!("Configuration loaded successfully");
    info!("  Allowed guilds: {}", config.allowed_guilds.join(", "));
    info!("  Game bot: {}", config.bot_user_id);

    let (console_tx, console_rx) = mpsc::unbounded_channel::<ConsoleCommand>();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let agent = Agent::from_config(&config);
    let discord_channels = DiscordChannels {
        console_rx,
        shutdown_rx,
    };

    let discord_bot = DiscordBotBuilder::new(config.token.clone(), agent, discord_channels)
        .build()
        .await
        .map_err(|e| DiscordError::SessionOpenFailed {
            message: e.to_string(),
        })?;

    info!("Starting Discord bot...");
    let mut discord_task = tokio::spawn(discord_bot.run());

    let console_task = tokio::spawn(console::run(console_tx));

    let finished = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        _ = console_task => None,
        result = &mut discord_task => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => {
            // Fire-and-forget: if the channel is closed the bot is already gone.
            if let Err(e) = shutdown_tx.send(true) {
                warn!("Shutdown channel closed (Discord task already exited): {}", e);
            }
            let timeout = tokio::time::Duration::from_secs(5);
            match tokio::time::timeout(timeout, discord_task).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Discord shutdown timed out");
                    Ok(Ok(()))
                }
            }
        }
    };

    match result {
        Ok(Ok(())) => info!("Discord session closed"),
        Ok(Err(e)) => return Err(e.into()),
        Err(e) => warn!("Discord task panicked: {}", e),
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
