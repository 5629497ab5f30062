use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_core::tally::{Step, Tally, tally_sequential};
use bastion_utils::embed::{HIDDEN_COLOR, LOCKED_COLOR, UNLOCKED_COLOR, action_embed, field};

use crate::audit::reply_and_publish;
use crate::channels::{fetch_guild_channel, require_voice_channel};
use crate::session::CommandSession;

/// Desired state of one permission bit in the `@everyone` overwrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overwrite {
    Deny,
    /// Remove the explicit deny and inherit from the role again.
    Inherit,
}

/// Apply `overwrite` for `permission` on top of an existing `(allow, deny)` pair,
/// leaving every other bit untouched.
pub fn merge_overwrite(
    existing: Option<(serenity::Permissions, serenity::Permissions)>,
    permission: serenity::Permissions,
    overwrite: Overwrite,
) -> (serenity::Permissions, serenity::Permissions) {
    let (mut allow, mut deny) =
        existing.unwrap_or((serenity::Permissions::empty(), serenity::Permissions::empty()));

    allow.remove(permission);
    match overwrite {
        Overwrite::Deny => deny.insert(permission),
        Overwrite::Inherit => deny.remove(permission),
    }

    (allow, deny)
}

pub async fn apply_everyone_overwrite(
    http: &serenity::Http,
    channel: &serenity::GuildChannel,
    permission: serenity::Permissions,
    overwrite: Overwrite,
) -> Result<(), Error> {
    let everyone = serenity::PermissionOverwriteType::Role(serenity::RoleId::new(
        channel.guild_id.get(),
    ));
    let existing = channel
        .permission_overwrites
        .iter()
        .find(|entry| entry.kind == everyone)
        .map(|entry| (entry.allow, entry.deny));

    let (allow, deny) = merge_overwrite(existing, permission, overwrite);
    if allow.is_empty() && deny.is_empty() {
        if existing.is_some() {
            channel.id.delete_permission(http, everyone).await?;
        }
        return Ok(());
    }

    channel
        .id
        .create_permission(
            http,
            serenity::PermissionOverwrite {
                allow,
                deny,
                kind: everyone,
            },
        )
        .await?;
    Ok(())
}

pub struct Toggle {
    pub permission: serenity::Permissions,
    pub overwrite: Overwrite,
    pub title: &'static str,
    /// `{channel}` is replaced with the channel mention.
    pub description: &'static str,
    pub actor_label: &'static str,
    pub channel_label: &'static str,
    pub color: u32,
}

pub const LOCK: Toggle = Toggle {
    permission: serenity::Permissions::SEND_MESSAGES,
    overwrite: Overwrite::Deny,
    title: "🔒 Channel Locked",
    description: "Channel {channel} has been locked",
    actor_label: "👮 Locked By",
    channel_label: "📍 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK: Toggle = Toggle {
    permission: serenity::Permissions::SEND_MESSAGES,
    overwrite: Overwrite::Inherit,
    title: "🔓 Channel Unlocked",
    description: "Channel {channel} has been unlocked",
    actor_label: "👮 Unlocked By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

pub const HIDE: Toggle = Toggle {
    permission: serenity::Permissions::VIEW_CHANNEL,
    overwrite: Overwrite::Deny,
    title: "👁️ Channel Hidden",
    description: "Channel has been hidden from @everyone",
    actor_label: "👮 Hidden By",
    channel_label: "📍 Channel",
    color: HIDDEN_COLOR,
};

pub const SHOW: Toggle = Toggle {
    permission: serenity::Permissions::VIEW_CHANNEL,
    overwrite: Overwrite::Inherit,
    title: "👁️ Channel Revealed",
    description: "Channel is now visible to @everyone",
    actor_label: "👮 Revealed By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

pub const LOCK_VOICE: Toggle = Toggle {
    permission: serenity::Permissions::CONNECT,
    overwrite: Overwrite::Deny,
    title: "🔒 Voice Channel Locked",
    description: "Voice channel {channel} has been locked",
    actor_label: "👮 Locked By",
    channel_label: "🎤 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK_VOICE: Toggle = Toggle {
    permission: serenity::Permissions::CONNECT,
    overwrite: Overwrite::Inherit,
    title: "🔓 Voice Channel Unlocked",
    description: "Voice channel {channel} has been unlocked",
    actor_label: "👮 Unlocked By",
    channel_label: "🎤 Channel",
    color: UNLOCKED_COLOR,
};

pub const HIDE_VOICE: Toggle = Toggle {
    permission: serenity::Permissions::VIEW_CHANNEL,
    overwrite: Overwrite::Deny,
    title: "👁️ Voice Channel Hidden",
    description: "Voice channel hidden from @everyone",
    actor_label: "👮 Hidden By",
    channel_label: "🎤 Channel",
    color: HIDDEN_COLOR,
};

pub const SHOW_VOICE: Toggle = Toggle {
    permission: serenity::Permissions::VIEW_CHANNEL,
    overwrite: Overwrite::Inherit,
    title: "👁️ Voice Channel Revealed",
    description: "Voice channel visible to @everyone",
    actor_label: "👮 Revealed By",
    channel_label: "🎤 Channel",
    color: UNLOCKED_COLOR,
};

pub const LOCK_LINKS: Toggle = Toggle {
    permission: serenity::Permissions::EMBED_LINKS,
    overwrite: Overwrite::Deny,
    title: "🔗 Links Locked",
    description: "Users cannot send clickable links in this channel",
    actor_label: "👮 Locked By",
    channel_label: "📍 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK_LINKS: Toggle = Toggle {
    permission: serenity::Permissions::EMBED_LINKS,
    overwrite: Overwrite::Inherit,
    title: "🔗 Links Unlocked",
    description: "Users can now send clickable links",
    actor_label: "👮 Unlocked By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

// Same bit as the link toggles: there is no separate embed permission.
pub const LOCK_EMBEDS: Toggle = Toggle {
    permission: serenity::Permissions::EMBED_LINKS,
    overwrite: Overwrite::Deny,
    title: "📎 Embeds Locked",
    description: "Link previews and embeds are disabled",
    actor_label: "👮 Locked By",
    channel_label: "📍 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK_EMBEDS: Toggle = Toggle {
    permission: serenity::Permissions::EMBED_LINKS,
    overwrite: Overwrite::Inherit,
    title: "📎 Embeds Unlocked",
    description: "Link previews and embeds are enabled",
    actor_label: "👮 Unlocked By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

pub const LOCK_ATTACHMENTS: Toggle = Toggle {
    permission: serenity::Permissions::ATTACH_FILES,
    overwrite: Overwrite::Deny,
    title: "📁 Attachments Locked",
    description: "Users cannot upload files",
    actor_label: "👮 Locked By",
    channel_label: "📍 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK_ATTACHMENTS: Toggle = Toggle {
    permission: serenity::Permissions::ATTACH_FILES,
    overwrite: Overwrite::Inherit,
    title: "📁 Attachments Unlocked",
    description: "Users can now upload files",
    actor_label: "👮 Unlocked By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

pub const LOCK_REACTIONS: Toggle = Toggle {
    permission: serenity::Permissions::ADD_REACTIONS,
    overwrite: Overwrite::Deny,
    title: "😶 Reactions Locked",
    description: "Users cannot add reactions",
    actor_label: "👮 Locked By",
    channel_label: "📍 Channel",
    color: LOCKED_COLOR,
};

pub const UNLOCK_REACTIONS: Toggle = Toggle {
    permission: serenity::Permissions::ADD_REACTIONS,
    overwrite: Overwrite::Inherit,
    title: "😀 Reactions Unlocked",
    description: "Users can now add reactions",
    actor_label: "👮 Unlocked By",
    channel_label: "📍 Channel",
    color: UNLOCKED_COLOR,
};

/// Toggle a permission on the invoking channel.
pub async fn toggle_current(session: &CommandSession, toggle: &Toggle) -> Result<(), Error> {
    let Some(channel) = fetch_guild_channel(session, session.channel_id()).await? else {
        session.say("❌ This command only works in server channels.").await?;
        return Ok(());
    };

    apply_toggle(session, &channel, toggle).await
}

/// Toggle a permission on the voice channel passed as the first argument.
pub async fn toggle_voice(session: &CommandSession, toggle: &Toggle) -> Result<(), Error> {
    let Some(channel) = require_voice_channel(session, session.channel_arg(0, "channel")).await?
    else {
        return Ok(());
    };

    apply_toggle(session, &channel, toggle).await
}

async fn apply_toggle(
    session: &CommandSession,
    channel: &serenity::GuildChannel,
    toggle: &Toggle,
) -> Result<(), Error> {
    apply_everyone_overwrite(session.http(), channel, toggle.permission, toggle.overwrite).await?;

    let mention = format!("<#{}>", channel.id);
    let description = toggle.description.replace("{channel}", &mention);
    let embed = action_embed(
        toggle.color,
        toggle.title,
        Some(&description),
        vec![
            field(toggle.channel_label, mention, true),
            field(toggle.actor_label, session.author().name.clone(), true),
        ],
    );

    reply_and_publish(session, embed).await
}

/// Apply `overwrite` to every text channel in the guild.
pub async fn lockdown(session: &CommandSession, overwrite: Overwrite) -> Result<(), Error> {
    let progress = match overwrite {
        Overwrite::Deny => "⏳ Locking all text channels...",
        Overwrite::Inherit => "⏳ Unlocking all text channels...",
    };
    session.defer(false, progress).await?;

    let mut channels: Vec<serenity::GuildChannel> = session
        .guild_id()
        .channels(session.http())
        .await?
        .into_values()
        .filter(|channel| channel.kind == serenity::ChannelType::Text)
        .collect();
    channels.sort_unstable_by_key(|channel| channel.position);

    let http = session.http();
    let tally = tally_sequential(channels, move |channel| async move {
        apply_everyone_overwrite(
            http,
            &channel,
            serenity::Permissions::SEND_MESSAGES,
            overwrite,
        )
        .await?;
        Ok(Step::Done)
    })
    .await;

    let (color, title, verb, actor_label, status) = match overwrite {
        Overwrite::Deny => (
            LOCKED_COLOR,
            "🔒 Server Lockdown",
            "Locked",
            "👮 Locked By",
            "Server in lockdown",
        ),
        Overwrite::Inherit => (
            UNLOCKED_COLOR,
            "🔓 Lockdown Ended",
            "Unlocked",
            "👮 Unlocked By",
            "Server unlocked",
        ),
    };

    let description = lockdown_summary(verb, &tally);
    let mut fields = vec![
        field(actor_label, session.author().name.clone(), true),
        field("📊 Status", status, true),
    ];
    if tally.failed > 0 {
        fields.push(field("⚠️ Failed", tally.failed.to_string(), true));
    }

    let embed = action_embed(color, title, Some(&description), fields);
    reply_and_publish(session, embed).await
}

fn lockdown_summary(verb: &str, tally: &Tally) -> String {
    format!("{} {}/{} text channels", verb, tally.succeeded, tally.attempted())
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use bastion_core::tally::Tally;

    use super::{LOCK, LOCK_VOICE, Overwrite, SHOW, lockdown_summary, merge_overwrite};

    #[test]
    fn lockdown_counts_failed_channels_in_the_total() {
        let tally = Tally {
            succeeded: 7,
            skipped: 0,
            failed: 2,
        };
        assert_eq!(lockdown_summary("Locked", &tally), "Locked 7/9 text channels");
        assert_eq!(
            lockdown_summary("Unlocked", &Tally::default()),
            "Unlocked 0/0 text channels"
        );
    }

    #[test]
    fn deny_keeps_unrelated_bits() {
        let existing = (
            serenity::Permissions::ATTACH_FILES,
            serenity::Permissions::ADD_REACTIONS,
        );
        let (allow, deny) = merge_overwrite(
            Some(existing),
            serenity::Permissions::SEND_MESSAGES,
            Overwrite::Deny,
        );

        assert_eq!(allow, serenity::Permissions::ATTACH_FILES);
        assert_eq!(
            deny,
            serenity::Permissions::ADD_REACTIONS | serenity::Permissions::SEND_MESSAGES
        );
    }

    #[test]
    fn deny_overrides_an_explicit_allow() {
        let existing = (
            serenity::Permissions::SEND_MESSAGES,
            serenity::Permissions::empty(),
        );
        let (allow, deny) = merge_overwrite(
            Some(existing),
            serenity::Permissions::SEND_MESSAGES,
            Overwrite::Deny,
        );

        assert!(allow.is_empty());
        assert_eq!(deny, serenity::Permissions::SEND_MESSAGES);
    }

    #[test]
    fn inherit_clears_only_the_target_bit() {
        let existing = (
            serenity::Permissions::empty(),
            serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
        );
        let (allow, deny) = merge_overwrite(
            Some(existing),
            serenity::Permissions::SEND_MESSAGES,
            Overwrite::Inherit,
        );

        assert!(allow.is_empty());
        assert_eq!(deny, serenity::Permissions::VIEW_CHANNEL);
    }

    #[test]
    fn inherit_without_overwrite_is_empty() {
        let (allow, deny) =
            merge_overwrite(None, serenity::Permissions::CONNECT, Overwrite::Inherit);
        assert!(allow.is_empty());
        assert!(deny.is_empty());
    }

    #[test]
    fn toggles_target_expected_permissions() {
        assert_eq!(LOCK.permission, serenity::Permissions::SEND_MESSAGES);
        assert_eq!(LOCK_VOICE.permission, serenity::Permissions::CONNECT);
        assert_eq!(SHOW.overwrite, Overwrite::Inherit);
        assert!(LOCK.description.contains("{channel}"));
    }
}
