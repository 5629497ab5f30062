use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_core::dispatch::InvocationStyle;
use bastion_utils::embed::{
    LOCKED_COLOR, NOTICE_COLOR, ROLE_FOOTER, UNLOCKED_COLOR, action_embed, field,
};
use bastion_utils::parse::parse_hex_color;
use bastion_utils::permissions::PermissionPreset;
use bastion_utils::time::{discord_timestamp, now_unix_secs};

use crate::audit::reply_and_publish;
use crate::roles::{
    ensure_manageable, fetch_all_members, members_with_role, require_role, role_mention,
};
use crate::session::CommandSession;

/// What `editrole` changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleEdit {
    Name(String),
    Color(u32),
    Preset(PermissionPreset),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleEditError {
    MissingProperty,
    UnknownProperty,
    MissingName,
    InvalidColor,
}

impl RoleEditError {
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingProperty | Self::UnknownProperty => {
                "❌ Please specify what to edit: `name`, `color`, `admin`, `text`, or `voice`"
            }
            Self::MissingName => {
                "❌ Please provide a new name. Usage: `editrole @role name <new name>`"
            }
            Self::InvalidColor => {
                "❌ Please provide a color hex code. Usage: `editrole @role color #FF0000`"
            }
        }
    }
}

pub fn parse_role_edit(property: Option<&str>, value: Option<&str>) -> Result<RoleEdit, RoleEditError> {
    let property = property
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|raw| !raw.is_empty())
        .ok_or(RoleEditError::MissingProperty)?;
    let value = value.map(str::trim).filter(|raw| !raw.is_empty());

    match property.as_str() {
        "name" => value
            .map(|name| RoleEdit::Name(name.to_owned()))
            .ok_or(RoleEditError::MissingName),
        "color" | "colour" => value
            .and_then(parse_hex_color)
            .map(RoleEdit::Color)
            .ok_or(RoleEditError::InvalidColor),
        other => PermissionPreset::parse(other)
            .map(RoleEdit::Preset)
            .ok_or(RoleEditError::UnknownProperty),
    }
}

pub async fn create_role(session: &CommandSession) -> Result<(), Error> {
    let Some(name) = session.text_arg(0, " ", "name") else {
        session
            .say("❌ Please provide a name for the role. Usage: `createrole <name>`")
            .await?;
        return Ok(());
    };

    let color = match session.string_option("color") {
        Some(raw) => match parse_hex_color(raw) {
            Some(color) => Some(color),
            None => {
                session
                    .say("❌ Invalid color. Use a hex value like `#FF0000`.")
                    .await?;
                return Ok(());
            }
        },
        None => None,
    };

    let reason = format!("Role created by {}", session.author().name);
    let mut builder = serenity::EditRole::new()
        .name(&name)
        .audit_log_reason(&reason);
    if let Some(color) = color {
        builder = builder.colour(color);
    }

    let role = session
        .guild_id()
        .create_role(session.http(), builder)
        .await?;

    let embed = action_embed(
        UNLOCKED_COLOR,
        "✅ Role Created",
        Some("Successfully created new role"),
        vec![
            field("🎭 Role", role_mention(role.id), true),
            field("🆔 Role ID", format!("`{}`", role.id), true),
            field("👑 Created By", session.author().name.clone(), true),
            field(
                "⏰ Created At",
                discord_timestamp(now_unix_secs() as i64, 'F'),
                true,
            ),
        ],
    )
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    reply_and_publish(session, embed).await
}

pub async fn delete_role(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(session, &roles, 0, "role", "deleterole @role").await? else {
        return Ok(());
    };

    if !ensure_manageable(session, &roles, &role, "delete").await? {
        return Ok(());
    }

    let members = fetch_all_members(session.http(), guild_id).await?;
    let member_count = members_with_role(members, role.id).len();

    let reason = format!("Role deleted by {}", session.author().name);
    session
        .http()
        .delete_role(guild_id, role.id, Some(&reason))
        .await?;

    let embed = action_embed(
        LOCKED_COLOR,
        "🗑️ Role Deleted",
        Some("Successfully deleted role"),
        vec![
            field("🎭 Role Name", role.name.clone(), true),
            field("🆔 Role ID", format!("`{}`", role.id), true),
            field("👥 Members Had", member_count.to_string(), true),
            field("👑 Deleted By", session.author().name.clone(), true),
            field(
                "⏰ Deleted At",
                discord_timestamp(now_unix_secs() as i64, 'F'),
                true,
            ),
        ],
    )
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    reply_and_publish(session, embed).await
}

pub async fn edit_role(session: &CommandSession) -> Result<(), Error> {
    let guild_id = session.guild_id();
    let roles = guild_id.roles(session.http()).await?;
    let Some(role) = require_role(
        session,
        &roles,
        0,
        "role",
        "editrole @role <name|color|admin|text|voice> [value]",
    )
    .await?
    else {
        return Ok(());
    };

    if !ensure_manageable(session, &roles, &role, "edit").await? {
        return Ok(());
    }

    let (property, value) = match session.style() {
        InvocationStyle::Text => (
            session.token(1).map(str::to_owned),
            session.text_arg(2, " ", "value"),
        ),
        InvocationStyle::Structured => (
            session.string_option("property").map(str::to_owned),
            session.string_option("value").map(str::to_owned),
        ),
    };

    let edit = match parse_role_edit(property.as_deref(), value.as_deref()) {
        Ok(edit) => edit,
        Err(error) => {
            session.say(error.message()).await?;
            return Ok(());
        }
    };

    let reason = format!("Role updated by {}", session.author().name);
    let builder = serenity::EditRole::new().audit_log_reason(&reason);
    let builder = match &edit {
        RoleEdit::Name(name) => builder.name(name),
        RoleEdit::Color(color) => builder.colour(*color),
        RoleEdit::Preset(preset) => builder.permissions(preset.permissions()),
    };

    guild_id
        .edit_role(session.http(), role.id, builder)
        .await?;

    let author = session.author().name.clone();
    let embed = match edit {
        RoleEdit::Name(name) => action_embed(
            NOTICE_COLOR,
            "✏️ Role Name Updated",
            Some("Successfully updated role name"),
            vec![
                field("🎭 Role", role_mention(role.id), true),
                field("📝 New Name", name, true),
                field("👑 Updated By", author, true),
            ],
        ),
        RoleEdit::Color(color) => action_embed(
            color,
            "🎨 Role Color Updated",
            Some("Successfully updated role color"),
            vec![
                field("🎭 Role", role_mention(role.id), true),
                field("🎨 New Color", format!("#{:06X}", color), true),
                field("👑 Updated By", author, true),
            ],
        ),
        RoleEdit::Preset(preset) => action_embed(
            NOTICE_COLOR,
            "✏️ Role Permissions Updated",
            Some("Successfully updated role permissions"),
            vec![
                field("🎭 Role", role_mention(role.id), true),
                field("📝 Permission Type", preset.description(), true),
                field("👑 Updated By", author, true),
                field(
                    "⏰ Updated At",
                    discord_timestamp(now_unix_secs() as i64, 'F'),
                    true,
                ),
            ],
        ),
    }
    .footer(serenity::CreateEmbedFooter::new(ROLE_FOOTER));

    reply_and_publish(session, embed).await
}

#[cfg(test)]
mod tests {
    use bastion_utils::permissions::PermissionPreset;

    use super::{RoleEdit, RoleEditError, parse_role_edit};

    #[test]
    fn parses_name_and_color_edits() {
        assert_eq!(
            parse_role_edit(Some("NAME"), Some(" Night Owls ")),
            Ok(RoleEdit::Name("Night Owls".to_owned()))
        );
        assert_eq!(
            parse_role_edit(Some("color"), Some("#00FF00")),
            Ok(RoleEdit::Color(0x00FF00))
        );
    }

    #[test]
    fn parses_permission_presets() {
        assert_eq!(
            parse_role_edit(Some("voice"), None),
            Ok(RoleEdit::Preset(PermissionPreset::Voice))
        );
        assert_eq!(
            parse_role_edit(Some("admin"), Some("ignored")),
            Ok(RoleEdit::Preset(PermissionPreset::Admin))
        );
    }

    #[test]
    fn rejects_incomplete_edits() {
        assert_eq!(parse_role_edit(None, None), Err(RoleEditError::MissingProperty));
        assert_eq!(
            parse_role_edit(Some("name"), Some("  ")),
            Err(RoleEditError::MissingName)
        );
        assert_eq!(
            parse_role_edit(Some("color"), Some("red")),
            Err(RoleEditError::InvalidColor)
        );
        assert_eq!(
            parse_role_edit(Some("hoist"), Some("yes")),
            Err(RoleEditError::UnknownProperty)
        );
    }
}
