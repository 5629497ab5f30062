use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_database::GuildConfigField;
use bastion_utils::embed::{HIDDEN_COLOR, UNLOCKED_COLOR, action_embed, field};
use bastion_utils::parse::parse_channel_id;

use crate::audit::reply_and_publish;
use crate::channels::fetch_guild_channel;
use crate::session::CommandSession;

pub async fn enable_join_to_create(session: &CommandSession) -> Result<(), Error> {
    let channel = match session.channel_arg(0, "channel") {
        Some(channel_id) => fetch_guild_channel(session, channel_id)
            .await
            .ok()
            .flatten()
            .filter(|channel| channel.kind == serenity::ChannelType::Voice),
        None => None,
    };

    let Some(channel) = channel else {
        session
            .say("❌ Please mention a valid voice channel for Join-to-Create.")
            .await?;
        return Ok(());
    };

    session
        .data
        .configs
        .set(
            session.guild_id().get(),
            GuildConfigField::JoinToCreateChannel,
            channel.id.get(),
        )
        .await?;

    let embed = action_embed(
        UNLOCKED_COLOR,
        "✅ Join-to-Create Enabled",
        Some("Users joining this channel will get their own temporary voice channel"),
        vec![
            field("👮 Set By", session.author().name.clone(), true),
            field("🎤 Trigger Channel", channel.name.clone(), true),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn disable_join_to_create(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id().get();
    let configs = &session.data.configs;

    if configs
        .channel(guild_id, GuildConfigField::JoinToCreateChannel)
        .await?
        .is_none()
    {
        session
            .say("❌ Join-to-Create is not enabled on this server.")
            .await?;
        return Ok(());
    }

    configs
        .clear(guild_id, GuildConfigField::JoinToCreateChannel)
        .await?;

    let embed = action_embed(
        HIDDEN_COLOR,
        "❌ Join-to-Create Disabled",
        Some("Join-to-Create system has been disabled"),
        vec![field("👮 Disabled By", session.author().name.clone(), true)],
    );

    reply_and_publish(session, embed).await
}

pub async fn admin_channel(session: &CommandSession) -> Result<(), Error> {
    configure_channel(session, GuildConfigField::AdminChannel, "Admin channel").await
}

pub async fn log_channel(session: &CommandSession) -> Result<(), Error> {
    configure_channel(session, GuildConfigField::LogChannel, "Audit-log channel").await
}

/// Show, set or clear one channel field of the guild config.
async fn configure_channel(
    session: &CommandSession,
    target: GuildConfigField,
    label: &str,
) -> Result<(), Error> {
    let guild_id = session.guild_id().get();
    let configs = &session.data.configs;

    if let Some(input) = session.token(0).map(str::trim).filter(|raw| !raw.is_empty()) {
        if input.eq_ignore_ascii_case("clear") {
            configs.clear(guild_id, target).await?;
            session.say(format!("{} cleared.", label)).await?;
            return Ok(());
        }

        let channel = match parse_channel_id(input) {
            Some(channel_id) => {
                fetch_guild_channel(session, serenity::ChannelId::new(channel_id))
                    .await
                    .ok()
                    .flatten()
            }
            None => None,
        };

        let Some(channel) = channel else {
            session
                .say("Provide a valid channel mention/id, or `clear`.")
                .await?;
            return Ok(());
        };

        configs.set(guild_id, target, channel.id.get()).await?;
        session
            .say(format!("{} set to <#{}>.", label, channel.id))
            .await?;
        return Ok(());
    }

    match configs.channel(guild_id, target).await? {
        Some(channel_id) => {
            session
                .say(format!("Current {}: <#{}>", label.to_lowercase(), channel_id))
                .await?
        }
        None => {
            session
                .say(format!("No {} configured.", label.to_lowercase()))
                .await?
        }
    }

    Ok(())
}
