use std::env;

use poise::serenity_prelude as serenity;

use crate::auth::AuthorizationPolicy;

pub const DEFAULT_BOT_OWNER_ID: u64 = 1_327_564_898_460_242_015;
pub const DEFAULT_OWNER_CHANNEL_ID: u64 = 1_410_011_813_398_974_626;

/// Process-wide identifiers, fixed for the lifetime of the bot.
#[derive(Clone, Debug)]
pub struct Settings {
    pub bot_owner_id: serenity::UserId,
    pub owner_channel_id: serenity::ChannelId,
    pub invite_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_owner_id: serenity::UserId::new(DEFAULT_BOT_OWNER_ID),
            owner_channel_id: serenity::ChannelId::new(DEFAULT_OWNER_CHANNEL_ID),
            invite_url: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let bot_owner_id = env_u64("BOT_OWNER_ID", DEFAULT_BOT_OWNER_ID).max(1);
        let owner_channel_id = env_u64("OWNER_CHANNEL_ID", DEFAULT_OWNER_CHANNEL_ID).max(1);
        let invite_url = env::var("BOT_INVITE_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Self {
            bot_owner_id: serenity::UserId::new(bot_owner_id),
            owner_channel_id: serenity::ChannelId::new(owner_channel_id),
            invite_url,
        }
    }

    pub fn policy(&self) -> AuthorizationPolicy {
        AuthorizationPolicy::new(self.owner_channel_id)
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_bool(&value),
        Err(_) => default,
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_OWNER_CHANNEL_ID, Settings, parse_bool};

    #[test]
    fn truthy_values() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn default_policy_uses_fallback_owner_channel() {
        let settings = Settings::default();
        assert_eq!(
            settings.policy().owner_channel_id().get(),
            DEFAULT_OWNER_CHANNEL_ID
        );
    }
}
