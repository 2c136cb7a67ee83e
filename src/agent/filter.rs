//! Inbound notification filtering.
//!
//! Only notifications posted by the game bot inside an allowed guild reach
//! the classifier. Everything else is dropped without side effects.

use std::collections::HashSet;

use crate::common::error::FilterRejection;
use crate::common::NotificationPayload;
use crate::config::Config;

/// Guild and author gate applied before classification.
#[derive(Debug, Clone)]
pub struct InboundFilter {
    allowed_guilds: HashSet<u64>,
    bot_user_id: u64,
    /// The agent's own account, known once the gateway reports ready.
    own_user_id: Option<u64>,
}

impl InboundFilter {
    pub fn new(allowed_guilds: impl IntoIterator<Item = u64>, bot_user_id: u64) -> Self {
        Self {
            allowed_guilds: allowed_guilds.into_iter().collect(),
            bot_user_id,
            own_user_id: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.allowed_guild_ids(), config.bot_user_snowflake())
    }

    /// Remember which account the agent itself is logged in as.
    pub fn set_own_user_id(&mut self, user_id: u64) {
        self.own_user_id = Some(user_id);
    }

    /// Accept the payload or say why it was rejected.
    pub fn check(&self, payload: &NotificationPayload) -> Result<(), FilterRejection> {
        if self.own_user_id == Some(payload.author_id) {
            return Err(FilterRejection::OwnMessage);
        }

        match payload.guild_id {
            Some(guild_id) if self.allowed_guilds.contains(&guild_id) => {}
            _ => return Err(FilterRejection::WrongGuild),
        }

        if payload.author_id != self.bot_user_id {
            return Err(FilterRejection::WrongAuthor);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 100;
    const GAME_BOT: u64 = 200;

    fn payload(guild_id: Option<u64>, author_id: u64) -> NotificationPayload {
        NotificationPayload {
            guild_id,
            author_id,
            ..Default::default()
        }
    }

    #[test]
    fn test_accepts_game_bot_in_allowed_guild() {
        let filter = InboundFilter::new([GUILD, 101], GAME_BOT);
        assert_eq!(filter.check(&payload(Some(GUILD), GAME_BOT)), Ok(()));
        assert_eq!(filter.check(&payload(Some(101), GAME_BOT)), Ok(()));
    }

    #[test]
    fn test_rejects_other_guild_and_direct_messages() {
        let filter = InboundFilter::new([GUILD], GAME_BOT);
        assert_eq!(
            filter.check(&payload(Some(999), GAME_BOT)),
            Err(FilterRejection::WrongGuild)
        );
        assert_eq!(
            filter.check(&payload(None, GAME_BOT)),
            Err(FilterRejection::WrongGuild)
        );
    }

    #[test]
    fn test_rejects_other_authors() {
        let filter = InboundFilter::new([GUILD], GAME_BOT);
        assert_eq!(
            filter.check(&payload(Some(GUILD), 555)),
            Err(FilterRejection::WrongAuthor)
        );
    }

    #[test]
    fn test_guild_checked_before_author() {
        let filter = InboundFilter::new([GUILD], GAME_BOT);
        assert_eq!(
            filter.check(&payload(Some(999), 555)),
            Err(FilterRejection::WrongGuild)
        );
    }

    #[test]
    fn test_rejects_own_messages() {
        let mut filter = InboundFilter::new([GUILD], GAME_BOT);
        filter.set_own_user_id(777);
        assert_eq!(
            filter.check(&payload(Some(GUILD), 777)),
            Err(FilterRejection::OwnMessage)
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            token: "t".to_string(),
            allowed_guilds: vec!["100".to_string()],
            bot_user_id: "200".to_string(),
        };
        let filter = InboundFilter::from_config(&config);
        assert!(filter.check(&payload(Some(GUILD), GAME_BOT)).is_ok());
    }
}
