//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure, read from `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord authentication token.
    pub token: String,
    /// Guilds whose traffic the agent reacts to.
    #[serde(default)]
    pub allowed_guilds: Vec<String>,
    /// User id of the game bot whose notifications drive the agent.
    #[serde(default)]
    pub bot_user_id: String,
}

impl Config {
    /// Allowed guild ids as snowflakes. Entries that are not numeric are skipped;
    /// validation reports them before this is ever called at runtime.
    pub fn allowed_guild_ids(&self) -> Vec<u64> {
        self.allowed_guilds
            .iter()
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }

    /// The game bot's user id as a snowflake, 0 when unparseable.
    pub fn bot_user_snowflake(&self) -> u64 {
        self.bot_user_id.trim().parse().unwrap_or(0)
    }
}
