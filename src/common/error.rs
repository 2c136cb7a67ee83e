//! Error types for the application.

use thiserror::Error;

/// Top-level application error. Anything surfacing as one of these ends the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discord error: {0}")]
    Discord(#[from] DiscordError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised while turning an embed into game events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("Malformed floor label '{title}': {reason}")]
    MalformedFloorLabel { title: String, reason: String },
}

/// Discord-related errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Failed to open Discord session: {message}")]
    SessionOpenFailed { message: String },

    #[error("Failed to send '{command}' to channel {channel_id}: {message}")]
    SendFailed {
        channel_id: u64,
        command: String,
        message: String,
    },

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Why an inbound notification was dropped before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterRejection {
    #[error("own-message")]
    OwnMessage,

    #[error("wrong-guild")]
    WrongGuild,

    #[error("wrong-author")]
    WrongAuthor,
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Discord operations.
pub type DiscordResult<T> = std::result::Result<T, DiscordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_reasons_render_as_kebab_case() {
        assert_eq!(FilterRejection::WrongGuild.to_string(), "wrong-guild");
        assert_eq!(FilterRejection::WrongAuthor.to_string(), "wrong-author");
        assert_eq!(FilterRejection::OwnMessage.to_string(), "own-message");
    }

    #[test]
    fn test_malformed_floor_label_mentions_title() {
        let err = ClassifyError::MalformedFloorLabel {
            title: "Challenging Floor 3x5".to_string(),
            reason: "missing '-' separator".to_string(),
        };
        assert!(err.to_string().contains("Challenging Floor 3x5"));
    }

    #[test]
    fn test_startup_failures_convert_into_app_error() {
        let config: AppError = ConfigError::ValidationError {
            message: "token is required".to_string(),
        }
        .into();
        assert!(matches!(config, AppError::Config(_)));
        assert!(config.to_string().contains("token is required"));

        let session: AppError = DiscordError::SessionOpenFailed {
            message: "401 Unauthorized".to_string(),
        }
        .into();
        assert!(matches!(session, AppError::Discord(DiscordError::SessionOpenFailed { .. })));
        assert!(session.to_string().contains("401 Unauthorized"));
    }
}
