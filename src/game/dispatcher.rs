//! Turns semantic events into outgoing commands and progress updates.

use serenity::async_trait;
use tracing::{error, info};

use crate::common::error::DiscordResult;
use crate::game::backoff::BackoffController;
use crate::game::classifier::SemanticEvent;
use crate::game::state::GameState;

/// Starts a battle at the current location.
pub const BATTLE_COMMAND: &str = ".battle";
/// Moves to the next floor after a win.
pub const NEXT_FLOOR_COMMAND: &str = ".fl next";

/// Command travelling to `location`.
pub fn travel_command(location: u32) -> String {
    format!(".loc {}", location)
}

/// Outgoing side of the chat transport.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Post `text` to `channel_id`.
    async fn send(&self, channel_id: u64, text: &str) -> DiscordResult<()>;
}

/// Whether the rest of a notification should still be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Applies events to the game state and answers them on the chat channel.
///
/// Sends are fire-and-forget: failures are logged and never retried, and a
/// state change made before a failed send is kept.
#[derive(Debug, Clone, Default)]
pub struct ActionDispatcher {
    backoff: BackoffController,
}

impl ActionDispatcher {
    pub fn new(backoff: BackoffController) -> Self {
        Self { backoff }
    }

    pub async fn dispatch<S>(
        &self,
        event: SemanticEvent,
        state: &mut GameState,
        sink: &S,
        channel_id: u64,
    ) -> Flow
    where
        S: CommandSink + ?Sized,
    {
        match event {
            SemanticEvent::EchoProgress => {
                send(sink, channel_id, &state.current_location().to_string()).await;
                send(sink, channel_id, &state.current_floor().to_string()).await;
            }
            SemanticEvent::TravelStarted | SemanticEvent::ArrivedAtLocation => {
                send(sink, channel_id, BATTLE_COMMAND).await;
            }
            SemanticEvent::BattleWon => {
                info!("Battle won");
                send(sink, channel_id, NEXT_FLOOR_COMMAND).await;
            }
            SemanticEvent::LocationPromptShown => {
                let location = state.advance_location();
                if !send(sink, channel_id, &travel_command(location)).await {
                    error!("Invalid location number {}", location);
                    return Flow::Halt;
                }
            }
            SemanticEvent::StaminaInsufficient => {
                self.backoff.cool_down().await;
                send(sink, channel_id, BATTLE_COMMAND).await;
            }
            SemanticEvent::FloorChallengeStarted { location, floor } => {
                info!("Challenging location {} floor {}", location, floor);
                state.set_progress(location, floor);
            }
        }
        Flow::Continue
    }
}

/// Send and log the outcome. Returns whether the send went through.
async fn send<S>(sink: &S, channel_id: u64, text: &str) -> bool
where
    S: CommandSink + ?Sized,
{
    match sink.send(channel_id, text).await {
        Ok(()) => {
            info!(channel_id, "-> {}", text);
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording sink shared by the dispatcher and agent tests.

    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::common::error::DiscordError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Sent {
        pub channel_id: u64,
        pub text: String,
        pub at: Instant,
    }

    /// Captures every send; texts listed in `failing` return an error instead.
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<Sent>>,
        pub failing: Vec<String>,
    }

    impl RecordingSink {
        pub fn failing_on(text: &str) -> Self {
            Self {
                failing: vec![text.to_string()],
                ..Default::default()
            }
        }

        pub fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|s| s.text.clone()).collect()
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandSink for RecordingSink {
        async fn send(&self, channel_id: u64, text: &str) -> DiscordResult<()> {
            if self.failing.iter().any(|f| f == text) {
                return Err(DiscordError::SendFailed {
                    channel_id,
                    command: text.to_string(),
                    message: "Missing Permissions".to_string(),
                });
            }
            self.sent.lock().unwrap().push(Sent {
                channel_id,
                text: text.to_string(),
                at: Instant::now(),
            });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::testing::RecordingSink;
    use super::*;
    use crate::common::ProgressSnapshot;

    const CHANNEL: u64 = 42;

    #[tokio::test]
    async fn test_battle_commands() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        let sink = RecordingSink::default();

        for event in [
            SemanticEvent::TravelStarted,
            SemanticEvent::ArrivedAtLocation,
            SemanticEvent::BattleWon,
        ] {
            assert_eq!(dispatcher.dispatch(event, &mut state, &sink, CHANNEL).await, Flow::Continue);
        }

        assert_eq!(sink.texts(), vec![".battle", ".battle", ".fl next"]);
        assert!(sink.sent().iter().all(|s| s.channel_id == CHANNEL));
        assert_eq!(state, GameState::new());
    }

    #[tokio::test]
    async fn test_echo_reports_location_then_floor() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        state.set_progress(4, 9);
        let sink = RecordingSink::default();

        dispatcher.dispatch(SemanticEvent::EchoProgress, &mut state, &sink, CHANNEL).await;

        assert_eq!(sink.texts(), vec!["4", "9"]);
        assert_eq!(state.snapshot(), ProgressSnapshot { location: 4, floor: 9 });
    }

    #[tokio::test]
    async fn test_location_prompt_is_not_idempotent() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        let sink = RecordingSink::default();

        dispatcher.dispatch(SemanticEvent::LocationPromptShown, &mut state, &sink, CHANNEL).await;
        dispatcher.dispatch(SemanticEvent::LocationPromptShown, &mut state, &sink, CHANNEL).await;

        assert_eq!(state.current_location(), 2);
        assert_eq!(sink.texts(), vec![".loc 1", ".loc 2"]);
    }

    #[tokio::test]
    async fn test_failed_travel_halts_but_keeps_increment() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        let sink = RecordingSink::failing_on(".loc 1");

        let flow = dispatcher
            .dispatch(SemanticEvent::LocationPromptShown, &mut state, &sink, CHANNEL)
            .await;

        assert_eq!(flow, Flow::Halt);
        assert_eq!(state.current_location(), 1);
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_battle_send_continues() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        let sink = RecordingSink::failing_on(BATTLE_COMMAND);

        let flow = dispatcher
            .dispatch(SemanticEvent::TravelStarted, &mut state, &sink, CHANNEL)
            .await;
        assert_eq!(flow, Flow::Continue);
    }

    #[tokio::test]
    async fn test_floor_challenge_overwrites_progress() {
        let dispatcher = ActionDispatcher::default();
        let mut state = GameState::new();
        state.set_progress(10, 10);
        let sink = RecordingSink::default();

        dispatcher
            .dispatch(
                SemanticEvent::FloorChallengeStarted { location: 3, floor: 5 },
                &mut state,
                &sink,
                CHANNEL,
            )
            .await;

        assert_eq!(state.snapshot(), ProgressSnapshot { location: 3, floor: 5 });
        assert!(sink.texts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stamina_waits_before_battle() {
        let dispatcher = ActionDispatcher::new(BackoffController::new(Duration::from_secs(1800)));
        let mut state = GameState::new();
        let sink = RecordingSink::default();
        let start = Instant::now();

        dispatcher
            .dispatch(SemanticEvent::StaminaInsufficient, &mut state, &sink, CHANNEL)
            .await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, ".battle");
        assert!(sent[0].at.duration_since(start) >= Duration::from_secs(1800));
    }

    #[test]
    fn test_travel_command_format() {
        assert_eq!(travel_command(12), ".loc 12");
    }
}
