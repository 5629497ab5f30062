use std::time::Instant;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::formatting::format_uptime;
use bastion_utils::time::{discord_timestamp, now_unix_secs};

use crate::session::CommandSession;

/// The configured invite link, or an administrator invite for this application.
pub fn invite_url(configured: Option<&str>, application_id: u64) -> String {
    match configured.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => url.to_owned(),
        None => format!(
            "https://discord.com/oauth2/authorize?client_id={}&permissions=8&scope=bot%20applications.commands",
            application_id
        ),
    }
}

pub async fn bot_stats(session: &CommandSession) -> Result<(), Error> {
    let uptime = session.data.started_at.elapsed().as_secs();

    let started = Instant::now();
    session.http().get_current_user().await?;
    let ping = started.elapsed().as_millis();

    let cache = &session.ctx.cache;
    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "🤖 Bot Statistics",
        None,
        vec![
            field("⏰ Uptime", format_uptime(uptime), true),
            field("📡 Ping", format!("{}ms", ping), true),
            field("🏰 Servers", cache.guild_count().to_string(), true),
            field("👥 Users", cache.user_count().to_string(), true),
            field("📦 Version", env!("CARGO_PKG_VERSION"), true),
        ],
    );

    session.send_embed(embed).await
}

pub async fn invite(session: &CommandSession) -> Result<(), Error> {
    let application_id = session.ctx.cache.current_user().id.get();
    let url = invite_url(session.data.settings.invite_url.as_deref(), application_id);

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "🔗 Invite Bot",
        Some(&format!("[Click here to invite the bot]({})", url)),
        vec![
            field("🔑 Permissions", "Administrator", true),
            field(
                "🏰 Servers",
                session.ctx.cache.guild_count().to_string(),
                true,
            ),
        ],
    );

    session.send_embed(embed).await
}

pub async fn uptime(session: &CommandSession) -> Result<(), Error> {
    let uptime = session.data.started_at.elapsed().as_secs();
    let started_at = now_unix_secs().saturating_sub(uptime) as i64;

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "⏰ Bot Uptime",
        Some(&format!("**{}**", format_uptime(uptime))),
        vec![field("📅 Started", discord_timestamp(started_at, 'F'), true)],
    );

    session.send_embed(embed).await
}

#[cfg(test)]
mod tests {
    use super::invite_url;

    #[test]
    fn configured_invite_wins() {
        assert_eq!(
            invite_url(Some(" https://example.com/invite "), 1),
            "https://example.com/invite"
        );
    }

    #[test]
    fn falls_back_to_admin_oauth_link() {
        let url = invite_url(Some(""), 123);
        assert!(url.contains("client_id=123"));
        assert!(url.contains("permissions=8"));
        assert_eq!(invite_url(None, 123), url);
    }
}
