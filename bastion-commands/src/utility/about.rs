use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_core::dispatch::{Router, Session};
use bastion_utils::COMMAND_PREFIX;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};

use crate::session::CommandSession;
use crate::{SLASH_ROUTER, TEXT_ROUTER};

fn command_count<S: Session>(router: &Router<S>) -> usize {
    router
        .dispatchers()
        .iter()
        .map(|dispatcher| dispatcher.canonical_names().len())
        .sum()
}

pub async fn about(session: &CommandSession) -> Result<(), Error> {
    let avatar = session.ctx.cache.current_user().face();

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "✿ Developer Information",
        Some("Server management for Discord: channel locks, voice controls, role tooling and server stats."),
        vec![
            field("📦 Version", env!("CARGO_PKG_VERSION"), true),
            field("⌨️ Prefix", format!("`{}`", COMMAND_PREFIX), true),
            field(
                "📋 Commands",
                format!(
                    "{} prefix • {} slash",
                    command_count(&TEXT_ROUTER),
                    command_count(&SLASH_ROUTER)
                ),
                true,
            ),
            field("🦀 Library", "serenity + poise", true),
        ],
    )
    .thumbnail(avatar)
    .footer(serenity::CreateEmbedFooter::new(format!(
        "Requested by {}",
        session.author().name
    )));

    session.send_embed(embed).await
}
