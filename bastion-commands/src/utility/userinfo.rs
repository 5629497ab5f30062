use std::collections::HashMap;

use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, action_embed, field};
use bastion_utils::formatting::yes_no;
use bastion_utils::time::discord_timestamp;

use crate::roles::role_mention;
use crate::session::{CommandSession, Outgoing};

const SHOWN_ROLES: usize = 10;

/// Role ids paired with their position, for the roles a member holds.
fn held_roles(
    member_roles: &[serenity::RoleId],
    roles: &HashMap<serenity::RoleId, serenity::Role>,
) -> Vec<(serenity::RoleId, u16)> {
    member_roles
        .iter()
        .filter_map(|role_id| roles.get(role_id))
        .map(|role| (role.id, role.position))
        .collect()
}

/// Mentions for held roles, highest first, capped at `max`.
pub fn top_role_mentions(mut held: Vec<(serenity::RoleId, u16)>, max: usize) -> String {
    if held.is_empty() {
        return "None".to_owned();
    }

    held.sort_unstable_by(|left, right| right.1.cmp(&left.1));
    let shown = held
        .iter()
        .take(max)
        .map(|(role_id, _)| role_mention(*role_id))
        .collect::<Vec<_>>()
        .join(" ");

    if held.len() > max {
        format!("{} +{} more", shown, held.len() - max)
    } else {
        shown
    }
}

pub async fn userinfo(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let user_id = session
        .user_arg(0, "user")
        .unwrap_or_else(|| session.author().id);

    let Ok(member) = guild_id.member(session.http(), user_id).await else {
        session
            .send(Outgoing::text("❌ User not found in this server.").ephemeral())
            .await?;
        return Ok(());
    };

    let guild = guild_id.to_partial_guild(session.http()).await?;
    let joined = member
        .joined_at
        .map(|joined| discord_timestamp(joined.unix_timestamp(), 'R'))
        .unwrap_or_else(|| "Unknown".to_owned());

    let embed = action_embed(
        DEFAULT_EMBED_COLOR,
        &format!("👤 User Information: {}", member.user.name),
        None,
        vec![
            field("🆔 User ID", format!("`{}`", member.user.id), true),
            field(
                "📅 Account Created",
                discord_timestamp(member.user.id.created_at().unix_timestamp(), 'R'),
                true,
            ),
            field("📥 Joined Server", joined, true),
            field(
                "🎭 Roles",
                top_role_mentions(held_roles(&member.roles, &guild.roles), SHOWN_ROLES),
                false,
            ),
            field("🤖 Bot", yes_no(member.user.bot), true),
            field("👑 Server Owner", yes_no(guild.owner_id == member.user.id), true),
        ],
    )
    .thumbnail(member.user.face());

    session.send_embed(embed).await
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::top_role_mentions;

    #[test]
    fn roles_are_ordered_and_capped() {
        let held = vec![
            (serenity::RoleId::new(10), 1),
            (serenity::RoleId::new(11), 5),
            (serenity::RoleId::new(12), 3),
        ];

        assert_eq!(
            top_role_mentions(held.clone(), 10),
            "<@&11> <@&12> <@&10>"
        );
        assert_eq!(top_role_mentions(held, 2), "<@&11> <@&12> +1 more");
        assert_eq!(top_role_mentions(Vec::new(), 10), "None");
    }
}
