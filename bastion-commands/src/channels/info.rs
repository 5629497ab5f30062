use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::permissions::key_channel_permissions;

use crate::channels::fetch_guild_channel;
use crate::session::CommandSession;

pub async fn permissions(session: &CommandSession) -> Result<(), Error> {
    let user_id = session
        .user_arg(0, "user")
        .unwrap_or_else(|| session.author().id);

    let guild = session.guild_id().to_partial_guild(session.http()).await?;
    let Ok(member) = guild.id.member(session.http(), user_id).await else {
        session.say("❌ User not found.").await?;
        return Ok(());
    };

    let Some(channel) = fetch_guild_channel(session, session.channel_id()).await? else {
        session.say("❌ This command only works in server channels.").await?;
        return Ok(());
    };

    let effective = guild.user_permissions_in(&channel, &member);
    let key = key_channel_permissions(effective);
    let key = if key.is_empty() {
        "No special permissions".to_owned()
    } else {
        key.join(", ")
    };

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "🔑 Channel Permissions",
        Some(&format!(
            "Permissions for {} in <#{}>",
            member.user.name,
            channel.id
        )),
        vec![
            field("👤 User", member.user.name.clone(), true),
            field("📍 Channel", channel.name.clone(), true),
            field("🔑 Key Permissions", key, false),
        ],
    );

    session.send_embed(embed).await
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChannelCounts {
    pub text: usize,
    pub voice: usize,
    pub categories: usize,
}

pub fn count_channels<'a>(
    kinds: impl IntoIterator<Item = &'a serenity::ChannelType>,
) -> ChannelCounts {
    let mut counts = ChannelCounts::default();
    for kind in kinds {
        match kind {
            serenity::ChannelType::Text => counts.text += 1,
            serenity::ChannelType::Voice => counts.voice += 1,
            serenity::ChannelType::Category => counts.categories += 1,
            _ => {}
        }
    }
    counts
}

pub async fn channels(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let channels = guild_id.channels(session.http()).await?;
    let counts = count_channels(channels.values().map(|channel| &channel.kind));

    let guild_name = guild_id
        .name(&session.ctx.cache)
        .unwrap_or_else(|| "this server".to_owned());

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📋 Server Channels",
        Some(&format!("Channel overview for {}", guild_name)),
        vec![
            field("💬 Text Channels", counts.text.to_string(), true),
            field("🎤 Voice Channels", counts.voice.to_string(), true),
            field("📁 Categories", counts.categories.to_string(), true),
        ],
    );

    session.send_embed(embed).await
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{ChannelCounts, count_channels};

    #[test]
    fn counts_only_known_kinds() {
        let kinds = [
            serenity::ChannelType::Text,
            serenity::ChannelType::Text,
            serenity::ChannelType::Voice,
            serenity::ChannelType::Category,
            serenity::ChannelType::News,
        ];

        assert_eq!(
            count_channels(kinds.iter()),
            ChannelCounts {
                text: 2,
                voice: 1,
                categories: 1,
            }
        );
    }
}
