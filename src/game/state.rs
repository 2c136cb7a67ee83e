//! Progress counters for the current climb.

use crate::common::ProgressSnapshot;

/// Where the agent believes it is in the game's location/floor progression.
///
/// Starts at zero and lives for the lifetime of the process. Counters only move
/// through [`GameState::advance_location`] (one step up) or
/// [`GameState::set_progress`] (absolute overwrite from a floor banner).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    current_location: u32,
    current_floor: u32,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_location(&self) -> u32 {
        self.current_location
    }

    pub fn current_floor(&self) -> u32 {
        self.current_floor
    }

    /// Move on to the next location and return it.
    pub fn advance_location(&mut self) -> u32 {
        self.current_location = self.current_location.saturating_add(1);
        self.current_location
    }

    /// Overwrite both counters with the values reported by the game.
    pub fn set_progress(&mut self, location: u32, floor: u32) {
        self.current_location = location;
        self.current_floor = floor;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            location: self.current_location,
            floor: self.current_floor,
        }
    }
}
