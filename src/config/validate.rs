//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.token.is_empty() {
        errors.push("token is required".to_string());
    }
    if config.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("token has not been configured (still using placeholder)".to_string());
    }

    if config.allowed_guilds.is_empty() {
        errors.push("allowed_guilds is empty - every notification would be ignored".to_string());
    }
    for (i, guild) in config.allowed_guilds.iter().enumerate() {
        if !is_snowflake(guild) {
            errors.push(format!(
                "allowed_guilds[{}] '{}' is not a valid guild id",
                i, guild
            ));
        }
    }

    if config.bot_user_id.is_empty() {
        errors.push("bot_user_id is required".to_string());
    } else if !is_snowflake(&config.bot_user_id) {
        errors.push(format!(
            "bot_user_id '{}' is not a valid user id",
            config.bot_user_id
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

/// Discord ids are non-zero 64-bit integers.
fn is_snowflake(value: &str) -> bool {
    matches!(value.trim().parse::<u64>(), Ok(id) if id != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_config() -> Config {
        Config {
            token: "valid_token_here".to_string(),
            allowed_guilds: vec!["123456789".to_string()],
            bot_user_id: "571027211407196161".to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&make_valid_config()).is_ok());
    }

    #[test]
    fn test_empty_token_fails() {
        let mut config = make_valid_config();
        config.token = String::new();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("token is required"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_no_allowed_guilds_fails() {
        let mut config = make_valid_config();
        config.allowed_guilds.clear();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("allowed_guilds"));
    }

    #[test]
    fn test_non_numeric_ids_fail() {
        let mut config = make_valid_config();
        config.allowed_guilds.push("my-server".to_string());
        config.bot_user_id = "anigame".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("allowed_guilds[1]"));
        assert!(message.contains("bot_user_id 'anigame'"));
    }

    #[test]
    fn test_zero_id_fails() {
        let mut config = make_valid_config();
        config.bot_user_id = "0".to_string();
        assert!(validate_config(&config).is_err());
    }
}
