use tracing::debug;

use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, NOTICE_COLOR, action_embed, field};

use crate::audit::{publish, reply_and_publish};
use crate::channels::fetch_guild_channel;
use crate::session::{CommandSession, Outgoing};

/// Create a copy of `channel` with its settings and permission overwrites.
async fn recreate(
    http: &serenity::Http,
    channel: &serenity::GuildChannel,
    reason: &str,
) -> Result<serenity::GuildChannel, Error> {
    let mut builder = serenity::CreateChannel::new(channel.name.clone())
        .kind(channel.kind)
        .position(channel.position)
        .nsfw(channel.nsfw)
        .permissions(channel.permission_overwrites.clone())
        .audit_log_reason(reason);

    if let Some(parent_id) = channel.parent_id {
        builder = builder.category(parent_id);
    }
    if let Some(topic) = &channel.topic {
        builder = builder.topic(topic.clone());
    }
    if let Some(rate_limit) = channel.rate_limit_per_user {
        builder = builder.rate_limit_per_user(rate_limit);
    }
    if let Some(bitrate) = channel.bitrate {
        builder = builder.bitrate(bitrate);
    }
    if let Some(user_limit) = channel.user_limit {
        builder = builder.user_limit(user_limit);
    }

    Ok(channel.guild_id.create_channel(http, builder).await?)
}

/// Replace the invoking channel with a fresh copy, wiping its history.
pub async fn nuke(session: &CommandSession) -> Result<(), Error> {
    session.defer(true, "💥 Nuking channel...").await?;

    let Some(old) = fetch_guild_channel(session, session.channel_id()).await? else {
        session.say("❌ This command only works in server channels.").await?;
        return Ok(());
    };

    let reason = format!("Channel nuked by {}", session.author().name);
    let fresh = recreate(session.http(), &old, &reason).await?;
    old.id.delete(session.http()).await?;

    let embed = action_embed(
        NOTICE_COLOR,
        "💥 Channel Nuked",
        Some("Channel has been nuked and recreated"),
        vec![
            field("👮 Nuked By", session.author().name.clone(), true),
            field("📍 Channel", format!("<#{}>", fresh.id), true),
        ],
    );

    fresh
        .id
        .send_message(session.http(), serenity::CreateMessage::new().embed(embed.clone()))
        .await?;
    publish(session, embed).await;

    // The channel the command was typed in no longer exists.
    if let Err(source) = session
        .send(Outgoing::text(format!("✅ Channel recreated as <#{}>.", fresh.id)).ephemeral())
        .await
    {
        debug!(?source, "could not confirm nuke to the invoker");
    }

    Ok(())
}

pub async fn clone(session: &CommandSession) -> Result<(), Error> {
    session.defer(true, "📋 Cloning channel...").await?;

    let Some(original) = fetch_guild_channel(session, session.channel_id()).await? else {
        session.say("❌ This command only works in server channels.").await?;
        return Ok(());
    };

    let reason = format!("Channel cloned by {}", session.author().name);
    let cloned = recreate(session.http(), &original, &reason).await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📋 Channel Cloned",
        None,
        vec![
            field("👮 Cloned By", session.author().name.clone(), true),
            field("📍 Original", format!("<#{}>", original.id), true),
            field("📍 Clone", format!("<#{}>", cloned.id), true),
        ],
    );

    reply_and_publish(session, embed).await
}
