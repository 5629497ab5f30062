//! Role management: create/edit/delete, inspection, and (bulk) assignment.

pub mod assign;
pub mod info;
pub mod manage;

use std::collections::HashMap;

use poise::serenity_prelude as serenity;

use bastion_core::dispatch::{CommandDispatcher, InvocationStyle};
use bastion_core::{AccessRule, Error};

use crate::CommandMeta;
use crate::session::CommandSession;

pub const HELP: &[CommandMeta] = &[
    CommandMeta {
        name: "createrole",
        desc: "Create a new role.",
        category: "roles",
        usage: "!createrole <name...>",
    },
    CommandMeta {
        name: "deleterole",
        desc: "Delete a role.",
        category: "roles",
        usage: "!deleterole <@role|id>",
    },
    CommandMeta {
        name: "editrole",
        desc: "Rename, recolor or apply a permission preset to a role.",
        category: "roles",
        usage: "!editrole <@role|id> <name|color|admin|text|voice> [value]",
    },
    CommandMeta {
        name: "roleinfo",
        desc: "Show details about a role.",
        category: "roles",
        usage: "!roleinfo <@role|id>",
    },
    CommandMeta {
        name: "inrole",
        desc: "List the members that have a role.",
        category: "roles",
        usage: "!inrole <@role|id>",
    },
    CommandMeta {
        name: "removeallroles",
        desc: "Strip every role from a member.",
        category: "roles",
        usage: "!removeallroles <@user>",
    },
    CommandMeta {
        name: "roleall",
        desc: "Give the target role to everyone holding the source role.",
        category: "roles",
        usage: "!roleall <@source_role> <@target_role>",
    },
];

pub fn text_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("roles", InvocationStyle::Text, AccessRule::Text)
        .command("createrole", &["cr"], |s| Box::pin(manage::create_role(s)))
        .command("deleterole", &["dr"], |s| Box::pin(manage::delete_role(s)))
        .command("editrole", &["er"], |s| Box::pin(manage::edit_role(s)))
        .command("roleinfo", &["ri"], |s| Box::pin(info::role_info(s)))
        .command("inrole", &["membersinrole"], |s| Box::pin(info::in_role(s)))
        .command("removeallroles", &["rar"], |s| {
            Box::pin(assign::remove_all_roles(s))
        })
        .command("roleall", &[], |s| Box::pin(assign::role_all(s)))
}

pub fn structured_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("roles", InvocationStyle::Structured, AccessRule::Structured)
        .command("addrole", &[], |s| Box::pin(assign::add_role(s)))
        .command("removerole", &[], |s| Box::pin(assign::remove_role(s)))
        .command("createrole", &[], |s| Box::pin(manage::create_role(s)))
        .command("deleterole", &[], |s| Box::pin(manage::delete_role(s)))
        .command("editrole", &[], |s| Box::pin(manage::edit_role(s)))
        .command("roleinfo", &[], |s| Box::pin(info::role_info(s)))
        .command("roles", &[], |s| Box::pin(info::list_roles(s)))
        .command("inrole", &[], |s| Box::pin(info::in_role(s)))
        .command("removeallroles", &[], |s| {
            Box::pin(assign::remove_all_roles(s))
        })
        .command("roleall", &[], |s| Box::pin(assign::role_all(s)))
}

/// Why the bot refuses to touch a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleBlock {
    Managed,
    AboveBot,
}

pub fn role_block(managed: bool, position: u16, bot_top_position: u16) -> Option<RoleBlock> {
    if managed {
        Some(RoleBlock::Managed)
    } else if position >= bot_top_position {
        Some(RoleBlock::AboveBot)
    } else {
        None
    }
}

pub fn role_block_message(block: RoleBlock, verb: &str) -> String {
    match block {
        RoleBlock::Managed => format!(
            "❌ Cannot {} managed roles (bot roles, booster role, etc.)",
            verb
        ),
        RoleBlock::AboveBot => format!(
            "❌ I cannot {} roles higher than or equal to my highest role.",
            verb
        ),
    }
}

pub fn highest_position(
    member_roles: &[serenity::RoleId],
    roles: &HashMap<serenity::RoleId, serenity::Role>,
) -> u16 {
    member_roles
        .iter()
        .filter_map(|role_id| roles.get(role_id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

/// Reply with a refusal and return `false` when the bot may not manage `role`.
pub async fn ensure_manageable(
    session: &CommandSession,
    roles: &HashMap<serenity::RoleId, serenity::Role>,
    role: &serenity::Role,
    verb: &str,
) -> Result<bool, Error> {
    let bot_id = session.ctx.cache.current_user().id;
    let bot_member = session.guild_id().member(session.http(), bot_id).await?;
    let bot_top = highest_position(&bot_member.roles, roles);

    match role_block(role.managed, role.position, bot_top) {
        Some(block) => {
            session.say(role_block_message(block, verb)).await?;
            Ok(false)
        }
        None => Ok(true),
    }
}

/// Look up the role argument, replying with `usage` when it is missing or unknown.
pub async fn require_role(
    session: &CommandSession,
    roles: &HashMap<serenity::RoleId, serenity::Role>,
    index: usize,
    option: &str,
    usage: &str,
) -> Result<Option<serenity::Role>, Error> {
    let role = session
        .role_arg(index, option)
        .and_then(|role_id| roles.get(&role_id))
        .cloned();

    if role.is_none() {
        session
            .say(format!(
                "❌ Please mention a role or provide a valid role ID. Usage: `{}`",
                usage
            ))
            .await?;
    }

    Ok(role)
}

/// Every member of the guild, paged through the members endpoint.
pub async fn fetch_all_members(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
) -> Result<Vec<serenity::Member>, Error> {
    const PAGE: u64 = 1000;

    let mut members = Vec::new();
    let mut after: Option<serenity::UserId> = None;
    loop {
        let page = guild_id.members(http, Some(PAGE), after).await?;
        let fetched = page.len();
        after = page.last().map(|member| member.user.id);
        members.extend(page);

        if (fetched as u64) < PAGE {
            break;
        }
    }

    Ok(members)
}

pub fn members_with_role(
    members: Vec<serenity::Member>,
    role_id: serenity::RoleId,
) -> Vec<serenity::Member> {
    members
        .into_iter()
        .filter(|member| member.roles.contains(&role_id))
        .collect()
}

pub fn role_mention(role_id: serenity::RoleId) -> String {
    format!("<@&{}>", role_id)
}

#[cfg(test)]
mod tests {
    use super::{RoleBlock, role_block, role_block_message};

    #[test]
    fn managed_roles_are_blocked_first() {
        assert_eq!(role_block(true, 1, 10), Some(RoleBlock::Managed));
        assert_eq!(role_block(true, 20, 10), Some(RoleBlock::Managed));
    }

    #[test]
    fn hierarchy_is_inclusive() {
        assert_eq!(role_block(false, 10, 10), Some(RoleBlock::AboveBot));
        assert_eq!(role_block(false, 11, 10), Some(RoleBlock::AboveBot));
        assert_eq!(role_block(false, 9, 10), None);
    }

    #[test]
    fn refusal_mentions_the_action() {
        assert!(role_block_message(RoleBlock::Managed, "delete").contains("Cannot delete"));
        assert!(role_block_message(RoleBlock::AboveBot, "assign").contains("cannot assign"));
    }
}
