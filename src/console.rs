//! Interactive stdin console.
//!
//! Reads one command per line and forwards it to the Discord worker, which
//! owns the agent. [`run`] returns when the user types `stop` or `exit`.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::common::ConsoleCommand;

const HELP_TEXT: &str = "\
Type 'start', 'auto' to begin automatic battling
Type 'pause' to stop reacting to the game bot without disconnecting
Type 'status' to show the current location and floor
Type 'stop', 'exit' to exit the CLI and stop the Bot";

/// How long `status` waits for the worker, which may be sitting in a cooldown.
const STATUS_TIMEOUT: Duration = Duration::from_secs(2);

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Help,
    Start,
    Pause,
    Status,
    Stop,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ConsoleInput {
    let text = line.trim();
    match text.to_lowercase().as_str() {
        "" => ConsoleInput::Empty,
        "help" | "info" => ConsoleInput::Help,
        "start" | "auto" => ConsoleInput::Start,
        "pause" => ConsoleInput::Pause,
        "status" => ConsoleInput::Status,
        "stop" | "exit" => ConsoleInput::Stop,
        _ => ConsoleInput::Invalid(text.to_string()),
    }
}

/// Run the console until the user asks to stop.
///
/// On end of input (no terminal attached) the console goes quiet and never
/// returns, leaving shutdown to signals.
pub async fn run(console_tx: mpsc::UnboundedSender<ConsoleCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("\nType 'help' or 'info', for more information.\nEnter Command: ");

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Console input closed");
                std::future::pending().await
            }
            Err(e) => {
                debug!("Console read error: {}", e);
                std::future::pending().await
            }
        };

        match parse_line(&line) {
            ConsoleInput::Empty => {}
            ConsoleInput::Help => println!("\n{}", HELP_TEXT),
            ConsoleInput::Start => {
                println!("\nStarting...");
                forward(&console_tx, ConsoleCommand::Start);
            }
            ConsoleInput::Pause => {
                println!("\nPausing...");
                forward(&console_tx, ConsoleCommand::Pause);
            }
            ConsoleInput::Status => print_status(&console_tx).await,
            ConsoleInput::Stop => {
                println!("\nStopping...");
                info!("Stop requested from console");
                return;
            }
            ConsoleInput::Invalid(text) => println!("\nInvalid Command: {}", text),
        }
    }
}

fn forward(console_tx: &mpsc::UnboundedSender<ConsoleCommand>, command: ConsoleCommand) {
    if console_tx.send(command).is_err() {
        println!("Agent is not running.");
    }
}

async fn print_status(console_tx: &mpsc::UnboundedSender<ConsoleCommand>) {
    let (reply, rx) = oneshot::channel();
    if console_tx.send(ConsoleCommand::Status { reply }).is_err() {
        println!("Agent is not running.");
        return;
    }

    match timeout(STATUS_TIMEOUT, rx).await {
        Ok(Ok(progress)) => println!(
            "\nLocation: {}\nFloor: {}",
            progress.location, progress.floor
        ),
        Ok(Err(_)) => println!("Agent is not running."),
        Err(_) => println!("Agent is busy (stamina cooldown?), try again later."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(parse_line("help"), ConsoleInput::Help);
        assert_eq!(parse_line("info"), ConsoleInput::Help);
        assert_eq!(parse_line("start"), ConsoleInput::Start);
        assert_eq!(parse_line("auto"), ConsoleInput::Start);
        assert_eq!(parse_line("stop"), ConsoleInput::Stop);
        assert_eq!(parse_line("exit"), ConsoleInput::Stop);
    }

    #[test]
    fn test_whitespace_and_case_ignored() {
        assert_eq!(parse_line("  STATUS \n"), ConsoleInput::Status);
        assert_eq!(parse_line("Pause"), ConsoleInput::Pause);
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse_line("battle"), ConsoleInput::Invalid("battle".to_string()));
    }
}
