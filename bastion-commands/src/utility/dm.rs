use poise::serenity_prelude as serenity;
use tracing::debug;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};

use crate::session::CommandSession;

pub async fn dm(session: &CommandSession) -> Result<(), Error> {
    let Some(user_id) = session.user_arg(0, "user") else {
        session.say("❌ Please mention a user to send a DM.").await?;
        return Ok(());
    };
    let Some(message) = session.text_arg(1, " ", "message") else {
        session.say("❌ Please provide a message to send.").await?;
        return Ok(());
    };

    let user = user_id.to_user(session.http()).await?;
    let guild = session.guild_id().to_partial_guild(session.http()).await?;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📧 Direct Message from Server Staff",
        Some(&message),
        vec![
            field("🏠 Server", guild.name.clone(), true),
            field("👤 From", session.author().name.clone(), true),
        ],
    );

    match user
        .direct_message(&session.ctx, serenity::CreateMessage::new().embed(embed))
        .await
    {
        Ok(_) => {
            session
                .say(format!("✅ DM sent successfully to {}", user.name))
                .await
        }
        Err(error) => {
            debug!(user_id = %user.id, "Direct message rejected: {error}");
            session
                .say("❌ Could not send DM. User may have DMs disabled.")
                .await
        }
    }
}
