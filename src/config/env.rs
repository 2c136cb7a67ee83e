//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `ANIGRIND_TOKEN` - Discord token
//! - `ANIGRIND_BOT_USER_ID` - user id of the game bot
//! - `ANIGRIND_CONFIG` - path of the config file

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "ANIGRIND";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{}_TOKEN", ENV_PREFIX)) {
        config.token = token;
    }
    if let Ok(bot_user_id) = env::var(format!("{}_BOT_USER_ID", ENV_PREFIX)) {
        config.bot_user_id = bot_user_id;
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `ANIGRIND_CONFIG` environment variable, otherwise returns "config.json".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "config.json".to_string())
}
