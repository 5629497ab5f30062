use poise::serenity_prelude as serenity;

use bastion_database::GuildConfig;

use crate::settings::Settings;

/// The invoking user for one command attempt, resolved once from the inbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorContext {
    pub user_id: serenity::UserId,
    pub guild_id: serenity::GuildId,
    pub channel_id: serenity::ChannelId,
    pub is_bot_owner: bool,
    pub is_guild_owner: bool,
    /// Holds `ADMINISTRATOR` in the guild.
    pub has_elevated_permission: bool,
}

impl ActorContext {
    pub fn resolve(
        settings: &Settings,
        user_id: serenity::UserId,
        guild_id: serenity::GuildId,
        guild_owner_id: serenity::UserId,
        channel_id: serenity::ChannelId,
        permissions: serenity::Permissions,
    ) -> Self {
        Self {
            user_id,
            guild_id,
            channel_id,
            is_bot_owner: user_id == settings.bot_owner_id,
            is_guild_owner: user_id == guild_owner_id,
            has_elevated_permission: permissions.contains(serenity::Permissions::ADMINISTRATOR),
        }
    }
}

/// Which gate a dispatcher applies before running a handler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessRule {
    /// Anyone may run the command.
    Public,
    /// Owners anywhere, administrators in the owner or admin channel.
    Text,
    /// Bot owner anywhere, guild owner only in the owner channel.
    Structured,
}

impl AccessRule {
    pub fn needs_guild_config(self) -> bool {
        matches!(self, Self::Text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorizationPolicy {
    owner_channel_id: serenity::ChannelId,
}

impl AuthorizationPolicy {
    pub fn new(owner_channel_id: serenity::ChannelId) -> Self {
        Self { owner_channel_id }
    }

    pub fn owner_channel_id(&self) -> serenity::ChannelId {
        self.owner_channel_id
    }

    pub fn permits(
        &self,
        rule: AccessRule,
        actor: &ActorContext,
        config: Option<&GuildConfig>,
    ) -> bool {
        match rule {
            AccessRule::Public => true,
            AccessRule::Text => self.is_authorized(actor, config),
            AccessRule::Structured => self.is_authorized_structured(actor),
        }
    }

    /// Gate for prefix commands. First matching rule wins.
    pub fn is_authorized(&self, actor: &ActorContext, config: Option<&GuildConfig>) -> bool {
        if actor.is_bot_owner {
            return true;
        }

        if actor.is_guild_owner {
            return true;
        }

        if !actor.has_elevated_permission {
            return false;
        }

        let admin_channel = config
            .and_then(|config| config.admin_channel_id)
            .map(serenity::ChannelId::new);

        actor.channel_id == self.owner_channel_id || Some(actor.channel_id) == admin_channel
    }

    /// Gate for slash commands. Stricter than [`Self::is_authorized`]: there is no
    /// administrator path and the configured admin channel is ignored.
    pub fn is_authorized_structured(&self, actor: &ActorContext) -> bool {
        actor.is_bot_owner || (actor.is_guild_owner && actor.channel_id == self.owner_channel_id)
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use bastion_database::GuildConfig;

    use super::{AccessRule, ActorContext, AuthorizationPolicy};
    use crate::settings::Settings;

    const FALLBACK: u64 = 100;
    const ADMIN: u64 = 200;
    const OTHER: u64 = 300;

    fn policy() -> AuthorizationPolicy {
        AuthorizationPolicy::new(serenity::ChannelId::new(FALLBACK))
    }

    fn config() -> GuildConfig {
        GuildConfig {
            guild_id: 1,
            admin_channel_id: Some(ADMIN),
            ..Default::default()
        }
    }

    fn actor(channel: u64, bot_owner: bool, guild_owner: bool, admin: bool) -> ActorContext {
        ActorContext {
            user_id: serenity::UserId::new(42),
            guild_id: serenity::GuildId::new(1),
            channel_id: serenity::ChannelId::new(channel),
            is_bot_owner: bot_owner,
            is_guild_owner: guild_owner,
            has_elevated_permission: admin,
        }
    }

    #[test]
    fn bot_owner_is_allowed_everywhere() {
        let config = config();
        for channel in [FALLBACK, ADMIN, OTHER] {
            for guild_owner in [false, true] {
                let actor = actor(channel, true, guild_owner, false);
                assert!(policy().is_authorized(&actor, Some(&config)));
                assert!(policy().is_authorized(&actor, None));
                assert!(policy().is_authorized_structured(&actor));
            }
        }
    }

    #[test]
    fn guild_owner_is_allowed_everywhere_for_text() {
        for channel in [FALLBACK, ADMIN, OTHER] {
            let actor = actor(channel, false, true, false);
            assert!(policy().is_authorized(&actor, Some(&config())));
            assert!(policy().is_authorized(&actor, None));
        }
    }

    #[test]
    fn admin_needs_owner_or_admin_channel() {
        let config = config();
        assert!(policy().is_authorized(&actor(FALLBACK, false, false, true), Some(&config)));
        assert!(policy().is_authorized(&actor(ADMIN, false, false, true), Some(&config)));
        assert!(!policy().is_authorized(&actor(OTHER, false, false, true), Some(&config)));
    }

    #[test]
    fn admin_channel_only_counts_when_configured() {
        assert!(policy().is_authorized(&actor(FALLBACK, false, false, true), None));
        assert!(!policy().is_authorized(&actor(ADMIN, false, false, true), None));
    }

    #[test]
    fn plain_members_are_always_denied() {
        let config = config();
        for channel in [FALLBACK, ADMIN, OTHER] {
            let actor = actor(channel, false, false, false);
            assert!(!policy().is_authorized(&actor, Some(&config)));
            assert!(!policy().is_authorized_structured(&actor));
        }
    }

    #[test]
    fn scenario_from_moderation_team() {
        let policy = AuthorizationPolicy::new(serenity::ChannelId::new(FALLBACK));
        let config = config();
        let moderator = actor(ADMIN, false, false, true);
        assert!(policy.is_authorized(&moderator, Some(&config)));

        let moderator_elsewhere = actor(OTHER, false, false, true);
        assert!(!policy.is_authorized(&moderator_elsewhere, Some(&config)));

        let owner = actor(OTHER, true, false, false);
        assert!(policy.is_authorized(&owner, Some(&config)));
    }

    // Slash commands are stricter than prefix commands. If the two ever get
    // unified this test has to change on purpose.
    #[test]
    fn structured_gate_diverges_from_text_gate() {
        let config = config();

        let guild_owner_elsewhere = actor(OTHER, false, true, false);
        assert!(policy().is_authorized(&guild_owner_elsewhere, Some(&config)));
        assert!(!policy().is_authorized_structured(&guild_owner_elsewhere));

        let guild_owner_in_fallback = actor(FALLBACK, false, true, false);
        assert!(policy().is_authorized_structured(&guild_owner_in_fallback));

        let admin_in_admin_channel = actor(ADMIN, false, false, true);
        assert!(policy().is_authorized(&admin_in_admin_channel, Some(&config)));
        assert!(!policy().is_authorized_structured(&admin_in_admin_channel));

        let admin_in_fallback = actor(FALLBACK, false, false, true);
        assert!(!policy().is_authorized_structured(&admin_in_fallback));
    }

    #[test]
    fn access_rules_select_gate() {
        let member = actor(OTHER, false, false, false);
        assert!(policy().permits(AccessRule::Public, &member, None));
        assert!(!policy().permits(AccessRule::Text, &member, None));
        assert!(!policy().permits(AccessRule::Structured, &member, None));
        assert!(AccessRule::Text.needs_guild_config());
        assert!(!AccessRule::Structured.needs_guild_config());
    }

    #[test]
    fn resolve_derives_flags() {
        let settings = Settings::default();
        let actor = ActorContext::resolve(
            &settings,
            settings.bot_owner_id,
            serenity::GuildId::new(1),
            serenity::UserId::new(5),
            serenity::ChannelId::new(OTHER),
            serenity::Permissions::ADMINISTRATOR | serenity::Permissions::SEND_MESSAGES,
        );
        assert!(actor.is_bot_owner);
        assert!(!actor.is_guild_owner);
        assert!(actor.has_elevated_permission);

        let member = ActorContext::resolve(
            &settings,
            serenity::UserId::new(5),
            serenity::GuildId::new(1),
            serenity::UserId::new(5),
            serenity::ChannelId::new(OTHER),
            serenity::Permissions::MANAGE_ROLES,
        );
        assert!(!member.is_bot_owner);
        assert!(member.is_guild_owner);
        assert!(!member.has_elevated_permission);
    }
}
