//! Classification of game bot notifications into semantic events.
//!
//! Each rule is an independent check against the payload. A single
//! notification can satisfy several rules at once, so classification returns
//! every match in table order rather than picking one.

use tracing::debug;

use crate::common::error::ClassifyError;
use crate::common::NotificationPayload;
use crate::game::sanitize::strip_formatting;

/// Message body the game bot sends in reply to a test command.
pub const ECHO_MARKER: &str = "done.";
/// Exact title of the embed posted after a won battle.
pub const VICTORY_BANNER: &str = "**Victory <a:CHEER:705920932677681253>**";

const TRAVEL_STARTED: &str = "Travelled to";
const LOCATION_PROMPT: &str = "area ID you would like to go to.";
const ARRIVED: &str = "Successfully travelled to";
const STAMINA_EXHAUSTED: &str = "You do not have enough stamina to proceed!";
const FLOOR_CHALLENGE: &str = "Challenging Floor";

/// Something that happened in the game, as far as the agent can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticEvent {
    /// The echo marker was seen; report progress back.
    EchoProgress,
    TravelStarted,
    BattleWon,
    /// The game asked which area to travel to next.
    LocationPromptShown,
    ArrivedAtLocation,
    StaminaInsufficient,
    /// A floor battle began; the banner carries the authoritative position.
    FloorChallengeStarted { location: u32, floor: u32 },
}

type RuleOutcome = Option<Result<SemanticEvent, ClassifyError>>;

struct Rule {
    name: &'static str,
    /// Rules reading embed fields are skipped for messages without an embed.
    needs_embed: bool,
    check: fn(&NotificationPayload) -> RuleOutcome,
}

const RULES: &[Rule] = &[
    Rule { name: "done-check", needs_embed: false, check: check_echo },
    Rule { name: "travel-start", needs_embed: true, check: check_travel_started },
    Rule { name: "victory", needs_embed: true, check: check_victory },
    Rule { name: "location-prompt", needs_embed: true, check: check_location_prompt },
    Rule { name: "arrival", needs_embed: true, check: check_arrival },
    Rule { name: "stamina", needs_embed: true, check: check_stamina },
    Rule { name: "floor-challenge", needs_embed: true, check: check_floor_challenge },
];

/// Run every rule against `payload`, returning the matches in rule order.
///
/// A rule that matches but cannot extract its data yields an `Err` in its slot.
pub fn classify(payload: &NotificationPayload) -> Vec<Result<SemanticEvent, ClassifyError>> {
    RULES
        .iter()
        .filter(|rule| payload.has_embed || !rule.needs_embed)
        .filter_map(|rule| {
            let outcome = (rule.check)(payload);
            if outcome.is_some() {
                debug!(rule = rule.name, message_id = payload.message_id, "Rule matched");
            }
            outcome
        })
        .collect()
}

fn check_echo(payload: &NotificationPayload) -> RuleOutcome {
    (payload.content == ECHO_MARKER).then_some(Ok(SemanticEvent::EchoProgress))
}

fn check_travel_started(payload: &NotificationPayload) -> RuleOutcome {
    payload
        .title()
        .contains(TRAVEL_STARTED)
        .then_some(Ok(SemanticEvent::TravelStarted))
}

fn check_victory(payload: &NotificationPayload) -> RuleOutcome {
    (payload.title() == VICTORY_BANNER).then_some(Ok(SemanticEvent::BattleWon))
}

fn check_location_prompt(payload: &NotificationPayload) -> RuleOutcome {
    payload
        .description()
        .contains(LOCATION_PROMPT)
        .then_some(Ok(SemanticEvent::LocationPromptShown))
}

fn check_arrival(payload: &NotificationPayload) -> RuleOutcome {
    payload
        .title()
        .contains(ARRIVED)
        .then_some(Ok(SemanticEvent::ArrivedAtLocation))
}

fn check_stamina(payload: &NotificationPayload) -> RuleOutcome {
    payload
        .description()
        .contains(STAMINA_EXHAUSTED)
        .then_some(Ok(SemanticEvent::StaminaInsufficient))
}

fn check_floor_challenge(payload: &NotificationPayload) -> RuleOutcome {
    let title = payload.title();
    if !title.contains(FLOOR_CHALLENGE) {
        return None;
    }
    Some(
        parse_floor_label(title)
            .map(|(location, floor)| SemanticEvent::FloorChallengeStarted { location, floor }),
    )
}

/// Extract `(location, floor)` from a banner like `**Challenging Floor 3-5**`.
///
/// The label is the third whitespace-separated word of the sanitized title,
/// made of two numbers joined by a hyphen. Anything after a second hyphen is ignored.
pub fn parse_floor_label(title: &str) -> Result<(u32, u32), ClassifyError> {
    let malformed = |reason: String| ClassifyError::MalformedFloorLabel {
        title: title.to_string(),
        reason,
    };

    let sanitized = strip_formatting(title);
    let label = sanitized
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| malformed("no location-floor segment".to_string()))?;

    let mut parts = label.split('-');
    let location = parts.next().unwrap_or_default();
    let floor = parts
        .next()
        .ok_or_else(|| malformed(format!("'{}' has no '-' separator", label)))?;

    let location = location
        .parse()
        .map_err(|e| malformed(format!("location '{}': {}", location, e)))?;
    let floor = floor
        .parse()
        .map_err(|e| malformed(format!("floor '{}': {}", floor, e)))?;

    Ok((location, floor))
}
