use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{
    DEFAULT_EMBED_COLOR, LOCKED_COLOR, UNLOCKED_COLOR, action_embed, field,
};
use bastion_utils::formatting::{
    escape_mentions, format_compact_duration, normalize_channel_name,
};
use bastion_utils::parse::{parse_hex_color, parse_in_range};
use bastion_utils::time::{discord_timestamp, now_unix_secs};

use crate::audit::{publish, reply_and_publish};
use crate::channels::fetch_guild_channel;
use crate::session::{CommandSession, Outgoing};

pub const MAX_SLOWMODE_SECONDS: i64 = 21_600;

pub async fn slowmode(session: &CommandSession) -> Result<(), Error> {
    let Some(seconds) = parse_in_range(
        session.token(0),
        0,
        MAX_SLOWMODE_SECONDS,
    ) else {
        session
            .say("❌ Please provide a valid number between 0 and 21600 seconds.")
            .await?;
        return Ok(());
    };

    let channel_id = session.channel_id();
    channel_id
        .edit(
            session.http(),
            serenity::EditChannel::new().rate_limit_per_user(seconds as u16),
        )
        .await?;

    let duration = if seconds == 0 {
        "Off".to_owned()
    } else {
        format_compact_duration(seconds as u64)
    };
    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "⏰ Slowmode Updated",
        Some(&format!("Slowmode set to {} seconds", seconds)),
        vec![
            field("👮 Set By", session.author().name.clone(), true),
            field("📍 Channel", format!("<#{}>", channel_id), true),
            field("⏱️ Duration", duration, true),
        ],
    );

    reply_and_publish(session, embed).await
}

fn channel_name(raw: &str) -> String {
    let words: Vec<String> = raw.split_whitespace().map(str::to_owned).collect();
    normalize_channel_name(&words)
}

pub async fn rename(session: &CommandSession) -> Result<(), Error> {
    let Some(new_name) = session.text_arg(0, " ", "name").map(|name| channel_name(&name)) else {
        session.say("❌ Please provide a new channel name.").await?;
        return Ok(());
    };

    let old_name = fetch_guild_channel(session, session.channel_id())
        .await?
        .map(|channel| channel.name)
        .unwrap_or_default();

    session
        .channel_id()
        .edit(session.http(), serenity::EditChannel::new().name(&new_name))
        .await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📝 Channel Renamed",
        Some("Channel name updated"),
        vec![
            field("👮 Renamed By", session.author().name.clone(), true),
            field("📍 Old Name", old_name, true),
            field("📍 New Name", new_name, true),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn topic(session: &CommandSession) -> Result<(), Error> {
    let Some(topic) = session.text_arg(0, " ", "topic") else {
        session.say("❌ Please provide a topic.").await?;
        return Ok(());
    };

    session
        .channel_id()
        .edit(session.http(), serenity::EditChannel::new().topic(&topic))
        .await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📋 Topic Updated",
        Some("Channel topic has been set"),
        vec![
            field("👮 Set By", session.author().name.clone(), true),
            field("📍 Channel", format!("<#{}>", session.channel_id()), true),
            field("📋 Topic", escape_mentions(&topic), false),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn set_nsfw(session: &CommandSession) -> Result<(), Error> {
    let Some(enabled) = session.bool_option("enabled") else {
        session
            .send(Outgoing::text("❌ Please choose whether NSFW is enabled.").ephemeral())
            .await?;
        return Ok(());
    };

    session
        .channel_id()
        .edit(session.http(), serenity::EditChannel::new().nsfw(enabled))
        .await?;

    let (color, title) = if enabled {
        (LOCKED_COLOR, "🔞 NSFW Enabled")
    } else {
        (UNLOCKED_COLOR, "✅ NSFW Disabled")
    };
    let embed = action_embed(
        color,
        title,
        None,
        vec![
            field("📍 Channel", format!("<#{}>", session.channel_id()), true),
            field("👮 Set By", session.author().name.clone(), true),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn announce(session: &CommandSession) -> Result<(), Error> {
    let (Some(title), Some(message)) = (
        session.text_arg(0, " ", "title"),
        session.text_arg(0, " ", "message"),
    ) else {
        session
            .send(Outgoing::text("❌ An announcement needs a title and a message.").ephemeral())
            .await?;
        return Ok(());
    };

    let color = match session.text_arg(0, " ", "color") {
        Some(raw) => match parse_hex_color(&raw) {
            Some(color) => color,
            None => {
                session
                    .send(
                        Outgoing::text("❌ Invalid color. Use a hex value like `#FF0000`.")
                            .ephemeral(),
                    )
                    .await?;
                return Ok(());
            }
        },
        None => DEFAULT_EMBED_COLOR,
    };

    let embed = action_embed(
        color,
        &format!("📢 {}", title),
        Some(&message),
        vec![
            field("👤 Announced By", session.author().name.clone(), true),
            field(
                "⏰ Time",
                discord_timestamp(now_unix_secs() as i64, 'F'),
                true,
            ),
        ],
    );

    session
        .channel_id()
        .send_message(session.http(), serenity::CreateMessage::new().embed(embed.clone()))
        .await?;
    session
        .send(Outgoing::text("✅ Announcement sent!").ephemeral())
        .await?;
    publish(session, embed).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::channel_name;

    #[test]
    fn renamed_channels_are_dashed_lowercase() {
        assert_eq!(channel_name("Staff Chat"), "staff-chat");
        assert_eq!(channel_name("  Game   Night  "), "game-night");
        assert_eq!(channel_name("general"), "general");
    }
}
