use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::formatting::numbered_list;
use bastion_utils::time::discord_timestamp;

use crate::roles::fetch_all_members;
use crate::session::{CommandSession, Outgoing};

const EMBED_DESCRIPTION_LIMIT: usize = 4096;
const BOOSTER_LIST_LIMIT: usize = 30;
const STICKER_LIST_LIMIT: usize = 30;

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberCounts {
    pub humans: usize,
    pub bots: usize,
}

impl MemberCounts {
    pub fn total(&self) -> usize {
        self.humans + self.bots
    }
}

pub fn count_members(bot_flags: impl IntoIterator<Item = bool>) -> MemberCounts {
    bot_flags
        .into_iter()
        .fold(MemberCounts::default(), |mut counts, bot| {
            if bot {
                counts.bots += 1;
            } else {
                counts.humans += 1;
            }
            counts
        })
}

pub async fn server_info(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let guild = guild_id.to_partial_guild_with_counts(session.http()).await?;
    let channels = guild_id.channels(session.http()).await?;

    let members = guild
        .approximate_member_count
        .map(|count| count.to_string())
        .unwrap_or_else(|| "Unknown".to_owned());

    let mut embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("🏰 {}", guild.name),
        guild.description.as_deref(),
        vec![
            field("🆔 Server ID", format!("`{}`", guild.id), true),
            field("👑 Owner", format!("<@{}>", guild.owner_id), true),
            field(
                "📅 Created",
                discord_timestamp(guild.id.created_at().unix_timestamp(), 'F'),
                true,
            ),
            field("👥 Members", members, true),
            field("💬 Channels", channels.len().to_string(), true),
            field("🎭 Roles", guild.roles.len().to_string(), true),
            field("😀 Emojis", guild.emojis.len().to_string(), true),
            field("🏷️ Stickers", guild.stickers.len().to_string(), true),
            field(
                "💎 Boost Level",
                u8::from(guild.premium_tier).to_string(),
                true,
            ),
            field(
                "🚀 Boosts",
                guild.premium_subscription_count.unwrap_or(0).to_string(),
                true,
            ),
            field(
                "🔒 Verification",
                format!("{:?}", guild.verification_level),
                true,
            ),
        ],
    );

    if let Some(icon) = guild.icon_url() {
        embed = embed.thumbnail(icon);
    }
    if let Some(banner) = &guild.banner {
        embed = embed.image(format!(
            "https://cdn.discordapp.com/banners/{}/{}.png?size=1024",
            guild.id, banner
        ));
    }

    session.send_embed(embed).await
}

pub async fn member_count(session: &CommandSession) -> Result<(), Error> {
    let members = fetch_all_members(session.http(), session.guild_id()).await?;
    let counts = count_members(members.iter().map(|member| member.user.bot));

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        "📊 Member Statistics",
        None,
        vec![
            field("👥 Total", counts.total().to_string(), true),
            field("🧑 Humans", counts.humans.to_string(), true),
            field("🤖 Bots", counts.bots.to_string(), true),
        ],
    );

    session.send_embed(embed).await
}

pub async fn emojis(session: &CommandSession) -> Result<(), Error> {
    let emojis = session.guild_id().emojis(session.http()).await?;
    if emojis.is_empty() {
        session
            .send(Outgoing::text("❌ No custom emojis in this server").ephemeral())
            .await?;
        return Ok(());
    }

    let listing = emojis
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("🎨 Server Emojis ({})", emojis.len()),
        Some(&truncate_chars(&listing, EMBED_DESCRIPTION_LIMIT)),
        vec![],
    );

    session.send_embed(embed).await
}

pub async fn stickers(session: &CommandSession) -> Result<(), Error> {
    let stickers = session.guild_id().stickers(session.http()).await?;
    if stickers.is_empty() {
        session
            .send(Outgoing::text("❌ No custom stickers in this server").ephemeral())
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = stickers.iter().map(|sticker| sticker.name.clone()).collect();
    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("🏷️ Server Stickers ({})", stickers.len()),
        Some(&numbered_list(&lines, STICKER_LIST_LIMIT, "stickers")),
        vec![],
    );

    session.send_embed(embed).await
}

pub async fn boosters(session: &CommandSession) -> Result<(), Error> {
    let members = fetch_all_members(session.http(), session.guild_id()).await?;
    let mut boosters: Vec<&serenity::Member> = members
        .iter()
        .filter(|member| member.premium_since.is_some())
        .collect();
    if boosters.is_empty() {
        session
            .send(Outgoing::text("❌ No boosters in this server").ephemeral())
            .await?;
        return Ok(());
    }

    boosters.sort_unstable_by_key(|member| member.premium_since);
    let lines: Vec<String> = boosters
        .iter()
        .map(|member| {
            let since = member
                .premium_since
                .map(|since| discord_timestamp(since.unix_timestamp(), 'R'))
                .unwrap_or_default();
            format!("<@{}> {}", member.user.id, since)
        })
        .collect();

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("💎 Server Boosters ({})", boosters.len()),
        Some(&numbered_list(&lines, BOOSTER_LIST_LIMIT, "boosters")),
        vec![],
    );

    session.send_embed(embed).await
}

#[cfg(test)]
mod tests {
    use super::{MemberCounts, count_members, truncate_chars};

    #[test]
    fn counts_humans_and_bots() {
        let counts = count_members([true, false, false, true, false]);
        assert_eq!(counts, MemberCounts { humans: 3, bots: 2 });
        assert_eq!(counts.total(), 5);
        assert_eq!(count_members([]).total(), 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("😀😀😀😀", 3), "😀😀…");
    }
}
