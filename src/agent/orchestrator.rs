//! The agent that ties filtering, classification and dispatch together.
//!
//! `Agent::handle` takes `&mut self`, so a caller can only feed it one
//! notification at a time. The Discord worker owns the agent and drains its
//! event queue sequentially, which keeps the progress counters free of
//! interleaved updates without any locking.

use tracing::{debug, info, warn};

use crate::common::error::FilterRejection;
use crate::common::{ConsoleCommand, NotificationPayload, ProgressSnapshot};
use crate::config::Config;
use crate::game::{
    classify, ActionDispatcher, BackoffController, CommandSink, Flow, GameState, SemanticEvent,
};

use super::InboundFilter;

/// What happened to a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dropped by the inbound filter.
    Rejected(FilterRejection),
    /// Accepted, but automation is paused.
    Paused,
    Handled {
        /// Events dispatched for this notification.
        dispatched: usize,
        /// The stamina cooldown ran while handling it.
        cooled_down: bool,
    },
}

/// Automated game player.
pub struct Agent {
    filter: InboundFilter,
    state: GameState,
    dispatcher: ActionDispatcher,
    enabled: bool,
}

impl Agent {
    pub fn new(filter: InboundFilter, dispatcher: ActionDispatcher) -> Self {
        Self {
            filter,
            state: GameState::new(),
            dispatcher,
            enabled: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            InboundFilter::from_config(config),
            ActionDispatcher::new(BackoffController::default()),
        )
    }

    pub fn set_own_user_id(&mut self, user_id: u64) {
        self.filter.set_own_user_id(user_id);
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.state.snapshot()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run only the inbound filter. Lets the transport skip fetching
    /// messages that would be rejected anyway.
    pub fn check(&self, payload: &NotificationPayload) -> Result<(), FilterRejection> {
        self.filter.check(payload)
    }

    /// Process one inbound notification end to end.
    ///
    /// Events are dispatched in rule order. Processing stops early when a
    /// floor label cannot be parsed or a travel command cannot be sent;
    /// whatever was already applied stays applied.
    pub async fn handle<S>(&mut self, payload: &NotificationPayload, sink: &S) -> Outcome
    where
        S: CommandSink + ?Sized,
    {
        if let Err(reason) = self.check(payload) {
            debug!(
                message_id = payload.message_id,
                author_id = payload.author_id,
                "Ignoring message: {}",
                reason
            );
            return Outcome::Rejected(reason);
        }

        if !self.enabled {
            debug!(message_id = payload.message_id, "Automation paused, not reacting");
            return Outcome::Paused;
        }

        if payload.has_embed {
            debug!(message_id = payload.message_id, "Embed title: {}", payload.title());
        }

        let mut dispatched = 0;
        let mut cooled_down = false;

        for result in classify(payload) {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    warn!("{}", e);
                    break;
                }
            };

            if event == SemanticEvent::StaminaInsufficient {
                cooled_down = true;
            }
            dispatched += 1;

            let flow = self
                .dispatcher
                .dispatch(event, &mut self.state, sink, payload.channel_id)
                .await;
            if flow == Flow::Halt {
                break;
            }
        }

        Outcome::Handled {
            dispatched,
            cooled_down,
        }
    }

    /// Apply a command typed on the console.
    pub fn handle_console(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Start => {
                if self.is_enabled() {
                    info!("Automation already running");
                } else {
                    info!("Automation started");
                }
                self.enabled = true;
            }
            ConsoleCommand::Pause => {
                info!("Automation paused");
                self.enabled = false;
            }
            ConsoleCommand::Status { reply } => {
                if reply.send(self.progress()).is_err() {
                    debug!("Status requester went away");
                }
            }
        }
    }
}
