use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::formatting::yes_no;

use crate::roles::{fetch_all_members, members_with_role, require_role};
use crate::session::{CommandSession, Outgoing};

const AVATAR_FORMATS: [&str; 3] = ["png", "jpg", "webp"];

/// Download links for one avatar hash in every static format.
pub fn avatar_links(user_id: serenity::UserId, hash: &str) -> String {
    AVATAR_FORMATS
        .iter()
        .map(|format| {
            format!(
                "[{}](https://cdn.discordapp.com/avatars/{}/{}.{}?size=1024)",
                format.to_ascii_uppercase(),
                user_id,
                hash,
                format
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

async fn target_user(session: &CommandSession) -> Result<serenity::User, Error> {
    match session.user_arg(0, "user") {
        Some(user_id) => Ok(user_id.to_user(session.http()).await?),
        None => Ok(session.author().clone()),
    }
}

pub async fn avatar(session: &CommandSession) -> Result<(), Error> {
    let user = target_user(session).await?;

    let links = match &user.avatar {
        Some(hash) => avatar_links(user.id, &hash.to_string()),
        None => format!("[Default]({})", user.default_avatar_url()),
    };

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("🖼️ {}'s Avatar", user.name),
        Some(&links),
        vec![],
    )
    .image(user.face());

    session.send_embed(embed).await
}

pub async fn banner(session: &CommandSession) -> Result<(), Error> {
    let target = target_user(session).await?;
    // Banners only come back on a fresh user fetch.
    let user = session.http().get_user(target.id).await?;

    let Some(url) = user.banner_url() else {
        session
            .send(Outgoing::text("❌ This user has no banner set").ephemeral())
            .await?;
        return Ok(());
    };

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("🎨 {}'s Banner", user.name),
        None,
        vec![],
    )
    .image(url);

    session.send_embed(embed).await
}

pub async fn role_color(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(session, &roles, 0, "role", "rolecolor @role").await? else {
        return Ok(());
    };

    let members = members_with_role(fetch_all_members(session.http(), guild_id).await?, role.id);
    let colour = role.colour;

    let embed = action_embed(
        colour.0,
        &format!("🎨 Role Color: {}", role.name),
        None,
        vec![
            field("🔷 Hex", format!("#{}", colour.hex()), true),
            field(
                "🔴 RGB",
                format!("{}, {}, {}", colour.r(), colour.g(), colour.b()),
                true,
            ),
            field("🔢 Integer", colour.0.to_string(), true),
            field("👥 Members", members.len().to_string(), true),
            field("📍 Position", role.position.to_string(), true),
            field("📌 Hoisted", yes_no(role.hoist), true),
        ],
    );

    session.send_embed(embed).await
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::avatar_links;

    #[test]
    fn links_cover_each_format() {
        let links = avatar_links(serenity::UserId::new(42), "abc");
        assert_eq!(
            links,
            "[PNG](https://cdn.discordapp.com/avatars/42/abc.png?size=1024) | \
             [JPG](https://cdn.discordapp.com/avatars/42/abc.jpg?size=1024) | \
             [WEBP](https://cdn.discordapp.com/avatars/42/abc.webp?size=1024)"
        );
    }
}
