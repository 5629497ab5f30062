use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_core::tally::{Step, tally_sequential};
use bastion_utils::embed::{
    BULK_COLOR, HIDDEN_COLOR, ROLE_FOOTER, UNLOCKED_COLOR, action_embed, field,
};
use bastion_utils::time::{discord_timestamp, now_unix_secs};

use crate::audit::reply_and_publish;
use crate::roles::{
    ensure_manageable, fetch_all_members, members_with_role, require_role, role_mention,
};
use crate::session::CommandSession;

/// Guild and bot owners never lose their roles through `removeallroles`.
pub fn is_protected_target(
    target: serenity::UserId,
    guild_owner: serenity::UserId,
    bot_owner: serenity::UserId,
) -> bool {
    target == guild_owner || target == bot_owner
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Change {
    Add,
    Remove,
}

pub async fn add_role(session: &CommandSession) -> Result<(), Error> {
    change_role(session, Change::Add).await
}

pub async fn remove_role(session: &CommandSession) -> Result<(), Error> {
    change_role(session, Change::Remove).await
}

async fn change_role(session: &CommandSession, change: Change) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let Some(user_id) = session.user_arg(0, "user") else {
        session.say("❌ User not found").await?;
        return Ok(());
    };

    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(session, &roles, 1, "role", "addrole @user @role").await? else {
        return Ok(());
    };

    let Ok(member) = guild_id.member(session.http(), user_id).await else {
        session.say("❌ User not found").await?;
        return Ok(());
    };

    let verb = match change {
        Change::Add => "assign",
        Change::Remove => "remove",
    };
    if !ensure_manageable(session, &roles, &role, verb).await? {
        return Ok(());
    }

    let http = session.http();
    let title = match change {
        Change::Add => {
            let reason = format!("Role added by {}", session.author().name);
            http.add_member_role(guild_id, user_id, role.id, Some(&reason))
                .await?;
            "✅ Role Added"
        }
        Change::Remove => {
            let reason = format!("Role removed by {}", session.author().name);
            http.remove_member_role(guild_id, user_id, role.id, Some(&reason))
                .await?;
            "✅ Role Removed"
        }
    };

    let embed = action_embed(
        UNLOCKED_COLOR,
        title,
        None,
        vec![
            field("👤 User", member.user.name.clone(), true),
            field("🎭 Role", role_mention(role.id), true),
        ],
    );

    reply_and_publish(session, embed).await
}

pub async fn remove_all_roles(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let Some(user_id) = session.user_arg(0, "user") else {
        session
            .say("❌ Please mention a user. Usage: `removeallroles @user`")
            .await?;
        return Ok(());
    };

    let Ok(member) = guild_id.member(session.http(), user_id).await else {
        session.say("❌ User not found in this server.").await?;
        return Ok(());
    };

    let guild = guild_id.to_partial_guild(session.http()).await?;
    if is_protected_target(user_id, guild.owner_id, session.data.settings.bot_owner_id) {
        session
            .say("❌ Cannot remove roles from the server owner or bot owner.")
            .await?;
        return Ok(());
    }

    let role_count = member.roles.len();
    if role_count == 0 {
        session
            .say(format!("❌ {} has no roles to remove.", member.user.name))
            .await?;
        return Ok(());
    }

    let reason = format!("All roles removed by {}", session.author().name);
    guild_id
        .edit_member(
            session.http(),
            user_id,
            serenity::EditMember::new()
                .roles(Vec::<serenity::RoleId>::new())
                .audit_log_reason(&reason),
        )
        .await?;

    let embed = action_embed(
        HIDDEN_COLOR,
        "🗑️ All Roles Removed",
        Some("Successfully removed all roles from user"),
        vec![
            field(
                "👤 User",
                format!("{} (`{}`)", member.user.name, member.user.id),
                true,
            ),
            field("🎭 Roles Removed", role_count.to_string(), true),
            field("👑 Removed By", session.author().name.clone(), true),
            field(
                "⏰ Removed At",
                discord_timestamp(now_unix_secs() as i64, 'F'),
                true,
            ),
        ],
    )
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    reply_and_publish(session, embed).await
}

/// Give `target_role` to every member holding `source_role`, one member at a time.
pub async fn role_all(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let (Some(source_id), Some(target_id)) = (
        session.role_arg(0, "source_role"),
        session.role_arg(1, "target_role"),
    ) else {
        return usage(session).await;
    };
    if source_id == target_id {
        return usage(session).await;
    }

    let roles = guild_id.roles(session.http()).await?;
    let (Some(source), Some(target)) = (roles.get(&source_id), roles.get(&target_id)) else {
        return usage(session).await;
    };

    let members = members_with_role(
        fetch_all_members(session.http(), guild_id).await?,
        source.id,
    );
    if members.is_empty() {
        session
            .say(format!(
                "❌ No members have the source role {}.",
                role_mention(source.id)
            ))
            .await?;
        return Ok(());
    }

    if !ensure_manageable(session, &roles, target, "assign").await? {
        return Ok(());
    }

    session
        .defer(
            false,
            &format!(
                "⏳ Processing... Adding {} to {} members with {}",
                role_mention(target.id),
                members.len(),
                role_mention(source.id)
            ),
        )
        .await?;

    let http = session.http();
    let target_id = target.id;
    let reason = format!("Bulk role assignment by {}", session.author().name);
    let reason = reason.as_str();

    let tally = tally_sequential(members, move |member| async move {
        if member.roles.contains(&target_id) {
            return Ok(Step::Skipped);
        }
        http.add_member_role(guild_id, member.user.id, target_id, Some(reason))
            .await?;
        Ok(Step::Done)
    })
    .await;

    let embed = action_embed(
        BULK_COLOR,
        "✅ Bulk Role Assignment Complete",
        Some("Finished assigning roles to members"),
        vec![
            field("🎭 Source Role", role_mention(source.id), true),
            field("🎯 Target Role", role_mention(target_id), true),
            field("👑 Executed By", session.author().name.clone(), true),
            field("✅ Successful", tally.succeeded.to_string(), true),
            field("➖ Already Had", tally.skipped.to_string(), true),
            field("❌ Failed", tally.failed.to_string(), true),
            field("📊 Total Processed", tally.attempted().to_string(), true),
            field(
                "⏰ Completed At",
                discord_timestamp(now_unix_secs() as i64, 'F'),
                true,
            ),
        ],
    )
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    reply_and_publish(session, embed).await
}

async fn usage(session: &CommandSession) -> Result<(), Error> {
    session
        .say("❌ Please mention two different roles. Usage: `roleall @source_role @target_role`")
        .await
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::is_protected_target;

    #[test]
    fn owners_are_protected() {
        let guild_owner = serenity::UserId::new(1);
        let bot_owner = serenity::UserId::new(2);

        assert!(is_protected_target(guild_owner, guild_owner, bot_owner));
        assert!(is_protected_target(bot_owner, guild_owner, bot_owner));
        assert!(!is_protected_target(
            serenity::UserId::new(3),
            guild_owner,
            bot_owner
        ));
    }
}
