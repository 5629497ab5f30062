use tracing::error;

use poise::serenity_prelude as serenity;

use bastion_database::GuildConfigField;

use crate::session::CommandSession;

/// Reply with `embed` and mirror it to the guild's audit-log channel.
pub async fn reply_and_publish(
    session: &CommandSession,
    embed: serenity::CreateEmbed,
) -> Result<(), bastion_core::Error> {
    session.send_embed(embed.clone()).await?;
    publish(session, embed).await;
    Ok(())
}

/// Post `embed` to the configured audit-log channel. Failures are logged only.
pub async fn publish(session: &CommandSession, embed: serenity::CreateEmbed) {
    if let Err(source) = publish_to_log_channel(session, embed).await {
        error!(
            ?source,
            guild_id = session.guild_id().get(),
            "failed to publish to the audit-log channel"
        );
    }
}

async fn publish_to_log_channel(
    session: &CommandSession,
    embed: serenity::CreateEmbed,
) -> Result<(), bastion_core::Error> {
    let channel_id = session
        .data
        .configs
        .channel(session.guild_id().get(), GuildConfigField::LogChannel)
        .await?;

    let Some(channel_id) = channel_id else {
        return Ok(());
    };

    let embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
        "By {} ({})",
        session.author().tag(),
        session.author().id
    )));

    serenity::ChannelId::new(channel_id)
        .send_message(session.http(), serenity::CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}
