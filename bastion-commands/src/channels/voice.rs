use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::formatting::user_limit_label;
use bastion_utils::parse::parse_in_range;

use crate::audit::reply_and_publish;
use crate::channels::require_voice_channel;
use crate::session::CommandSession;

pub const MAX_USER_LIMIT: i64 = 99;
pub const MIN_BITRATE_KBPS: i64 = 8;
pub const MAX_BITRATE_KBPS: i64 = 384;

pub async fn user_limit(session: &CommandSession) -> Result<(), Error> {
    let Some(channel) = require_voice_channel(session, session.channel_arg(0, "channel")).await?
    else {
        return Ok(());
    };

    let Some(limit) = parse_in_range(session.token(1), 0, MAX_USER_LIMIT) else {
        session
            .say("❌ Please provide a valid limit between 0 and 99.")
            .await?;
        return Ok(());
    };

    channel
        .id
        .edit(
            session.http(),
            serenity::EditChannel::new().user_limit(limit as u32),
        )
        .await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "👥 User Limit Set",
        Some("Voice channel user limit updated"),
        vec![
            field("👮 Set By", session.author().name.clone(), true),
            field("🎤 Channel", channel.name.clone(), true),
            field("👥 Limit", user_limit_label(limit as u32), true),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn bitrate(session: &CommandSession) -> Result<(), Error> {
    let Some(channel) = require_voice_channel(session, session.channel_arg(0, "channel")).await?
    else {
        return Ok(());
    };

    let Some(kbps) = parse_in_range(session.token(1), MIN_BITRATE_KBPS, MAX_BITRATE_KBPS) else {
        session
            .say("❌ Please provide a valid bitrate between 8 and 384 kbps.")
            .await?;
        return Ok(());
    };

    channel
        .id
        .edit(
            session.http(),
            serenity::EditChannel::new().bitrate(kbps as u32 * 1000),
        )
        .await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "🎵 Bitrate Updated",
        Some("Voice channel bitrate has been set"),
        vec![
            field("👮 Set By", session.author().name.clone(), true),
            field("🎤 Channel", channel.name.clone(), true),
            field("🎵 Bitrate", format!("{} kbps", kbps), true),
        ],
    );

    reply_and_publish(session, embed).await
}
