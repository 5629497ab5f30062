use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use bastion_core::Data;
use bastion_database::GuildConfigField;

const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Voice channels a member left and joined in one state update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    pub left: Option<serenity::ChannelId>,
    pub joined: Option<serenity::ChannelId>,
}

pub fn transition(
    old: Option<serenity::ChannelId>,
    new: Option<serenity::ChannelId>,
) -> Transition {
    if old == new {
        // Mute, deafen or stream toggles.
        return Transition::default();
    }
    Transition {
        left: old,
        joined: new,
    }
}

pub fn temp_channel_name(owner: &str) -> String {
    format!("{}'s Channel", owner)
        .chars()
        .take(MAX_CHANNEL_NAME_LEN)
        .collect()
}

/// Spawn a personal voice channel when a member enters the trigger channel,
/// and delete spawned channels once they empty out.
pub async fn handle_voice_state_update(
    ctx: &serenity::Context,
    data: &Data,
    old: Option<&serenity::VoiceState>,
    new: &serenity::VoiceState,
) {
    let Some(guild_id) = new.guild_id else {
        return;
    };

    let moved = transition(old.and_then(|state| state.channel_id), new.channel_id);

    if let Some(left) = moved.left {
        cleanup_if_empty(ctx, data, guild_id, left).await;
    }

    if let Some(joined) = moved.joined {
        let trigger = match data
            .configs
            .channel(guild_id.get(), GuildConfigField::JoinToCreateChannel)
            .await
        {
            Ok(trigger) => trigger,
            Err(source) => {
                error!(?source, guild_id = %guild_id, "failed to read join-to-create config");
                return;
            }
        };

        if trigger == Some(joined.get()) {
            spawn_channel(ctx, data, guild_id, joined, new).await;
        }
    }
}

async fn spawn_channel(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    trigger: serenity::ChannelId,
    state: &serenity::VoiceState,
) {
    let owner = state
        .member
        .as_ref()
        .map(|member| member.display_name().to_owned())
        .unwrap_or_else(|| state.user_id.to_string());

    let parent = match trigger.to_channel(ctx).await {
        Ok(serenity::Channel::Guild(channel)) => channel.parent_id,
        Ok(_) => None,
        Err(source) => {
            error!(?source, channel_id = %trigger, "failed to fetch join-to-create trigger");
            return;
        }
    };

    let mut builder = serenity::CreateChannel::new(temp_channel_name(&owner))
        .kind(serenity::ChannelType::Voice)
        .audit_log_reason("Join-to-Create");
    if let Some(parent) = parent {
        builder = builder.category(parent);
    }

    let channel = match guild_id.create_channel(ctx, builder).await {
        Ok(channel) => channel,
        Err(source) => {
            error!(?source, guild_id = %guild_id, "failed to create temporary voice channel");
            return;
        }
    };

    data.temp_voice_channels
        .write()
        .await
        .insert(channel.id.get());

    if let Err(source) = guild_id
        .move_member(ctx, state.user_id, channel.id)
        .await
    {
        error!(?source, user_id = %state.user_id, "failed to move member into temporary channel");
        cleanup_if_empty(ctx, data, guild_id, channel.id).await;
        return;
    }

    info!(
        guild_id = %guild_id,
        channel_id = %channel.id,
        user_id = %state.user_id,
        "Temporary voice channel created"
    );
}

async fn cleanup_if_empty(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
) {
    if !data
        .temp_voice_channels
        .read()
        .await
        .contains(&channel_id.get())
    {
        return;
    }

    let occupants = ctx.cache.guild(guild_id).map(|guild| {
        guild
            .voice_states
            .values()
            .filter(|state| state.channel_id == Some(channel_id))
            .count()
    });

    match occupants {
        Some(0) => {}
        Some(_) => return,
        None => {
            debug!(guild_id = %guild_id, "guild not cached; keeping temporary channel");
            return;
        }
    }

    data.temp_voice_channels
        .write()
        .await
        .remove(&channel_id.get());

    if let Err(source) = channel_id.delete(ctx).await {
        error!(?source, channel_id = %channel_id, "failed to delete temporary voice channel");
        return;
    }

    debug!(guild_id = %guild_id, channel_id = %channel_id, "Temporary voice channel removed");
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{Transition, temp_channel_name, transition};

    #[test]
    fn toggles_inside_a_channel_are_ignored() {
        let channel = Some(serenity::ChannelId::new(5));
        assert_eq!(transition(channel, channel), Transition::default());
        assert_eq!(transition(None, None), Transition::default());
    }

    #[test]
    fn moves_report_both_sides() {
        let from = serenity::ChannelId::new(1);
        let to = serenity::ChannelId::new(2);
        assert_eq!(
            transition(Some(from), Some(to)),
            Transition {
                left: Some(from),
                joined: Some(to),
            }
        );
        assert_eq!(transition(Some(from), None).joined, None);
        assert_eq!(transition(None, Some(to)).left, None);
    }

    #[test]
    fn names_are_capped() {
        assert_eq!(temp_channel_name("Ada"), "Ada's Channel");
        assert_eq!(temp_channel_name(&"x".repeat(200)).chars().count(), 100);
    }
}
