use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::{DEFAULT_EMBED_COLOR, NEUTRAL_COLOR, ROLE_FOOTER, action_embed, field};
use bastion_utils::formatting::{capped_join, numbered_list, yes_no};
use bastion_utils::permissions::permission_names;
use bastion_utils::time::discord_timestamp;

use crate::roles::{fetch_all_members, members_with_role, require_role, role_mention};
use crate::session::{CommandSession, Outgoing};

const MEMBER_LIST_LIMIT: usize = 20;
const ROLE_LIST_LIMIT: usize = 40;
const KEY_PERMISSION_LIMIT: usize = 10;

fn role_color(role: &serenity::Role) -> u32 {
    match role.colour.0 {
        0 => NEUTRAL_COLOR,
        color => color,
    }
}

pub async fn role_info(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(session, &roles, 0, "role", "roleinfo @role").await? else {
        return Ok(());
    };

    let members = fetch_all_members(session.http(), guild_id).await?;
    let member_count = members_with_role(members, role.id).len();

    let permissions = permission_names(role.permissions);
    let managed = if role.managed {
        "Yes (Bot/Integration)"
    } else {
        "No"
    };

    let embed = action_embed(
        role_color(&role),
        "🎭 Role Information",
        Some(&format!("Detailed information about {}", role_mention(role.id))),
        vec![
            field("🆔 Role ID", format!("`{}`", role.id), true),
            field("🎨 Color", format!("#{}", role.colour.hex()), true),
            field("📍 Position", role.position.to_string(), true),
            field("👥 Members", member_count.to_string(), true),
            field("📌 Hoisted", yes_no(role.hoist), true),
            field("🔔 Mentionable", yes_no(role.mentionable), true),
            field("🤖 Managed", managed, true),
            field(
                "⏰ Created",
                discord_timestamp(role.id.created_at().unix_timestamp(), 'F'),
                true,
            ),
            field(
                "📊 Total Permissions",
                role.permissions.bits().count_ones().to_string(),
                true,
            ),
            field(
                "🔑 Key Permissions",
                capped_join(&permissions, KEY_PERMISSION_LIMIT, "None"),
                false,
            ),
        ],
    )
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    session.send_embed(embed).await
}

pub async fn in_role(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(session, &roles, 0, "role", "inrole @role").await? else {
        return Ok(());
    };

    let members = members_with_role(fetch_all_members(session.http(), guild_id).await?, role.id);
    if members.is_empty() {
        session
            .send(
                Outgoing::text(format!("❌ No members have the role {}.", role_mention(role.id)))
                    .ephemeral(),
            )
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = members
        .iter()
        .map(|member| format!("{} (`{}`)", member.user.name, member.user.id))
        .collect();

    let embed = action_embed(
        role_color(&role),
        &format!("👥 Members with Role: {}", role.name),
        Some(&format!("Total members: **{}**", members.len())),
        vec![field(
            "📋 Member List",
            numbered_list(&lines, MEMBER_LIST_LIMIT, "members"),
            false,
        )],
    )
    .footer(serenity::CreateEmbedFooter::new(format!(
        "{} • Showing {}/{} members",
        ROLE_FOOTER,
        members.len().min(MEMBER_LIST_LIMIT),
        members.len()
    )));

    session.send_embed(embed).await
}

/// Roles ordered top to bottom, without `@everyone`.
pub fn ordered_roles(
    guild_id: serenity::GuildId,
    roles: impl IntoIterator<Item = serenity::Role>,
) -> Vec<serenity::Role> {
    let everyone = serenity::RoleId::new(guild_id.get());
    let mut roles: Vec<serenity::Role> = roles
        .into_iter()
        .filter(|role| role.id != everyone)
        .collect();
    roles.sort_unstable_by(|left, right| right.position.cmp(&left.position));
    roles
}

pub async fn list_roles(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = ordered_roles(guild_id, guild_id.roles(session.http()).await?.into_values());

    let lines: Vec<String> = roles.iter().map(|role| role_mention(role.id)).collect();
    let description = if lines.is_empty() {
        "This server has no roles.".to_owned()
    } else {
        numbered_list(&lines, ROLE_LIST_LIMIT, "roles")
    };

    let embed = action_embed(DEFAULT_EMBED_COLOR, "🎭 Server Roles", Some(&description), vec![])
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Total: {} roles",
            roles.len()
        )));

    session.send_embed(embed).await
}
