use poise::serenity_prelude as serenity;

/// Convert a permission bitset into a sorted display list.
///
/// If `ADMINISTRATOR` is present, only `ADMINISTRATOR` is returned because
/// it implicitly grants all permissions.
pub fn permission_names(perms: serenity::Permissions) -> Vec<String> {
    if perms.contains(serenity::Permissions::ADMINISTRATOR) {
        return vec!["ADMINISTRATOR".to_owned()];
    }

    let mut names: Vec<String> = perms
        .iter_names()
        .map(|(name, _flag)| name.to_owned())
        .collect();
    names.sort_unstable();
    names
}

const KEY_CHANNEL_PERMISSIONS: &[(serenity::Permissions, &str)] = &[
    (serenity::Permissions::ADMINISTRATOR, "Administrator"),
    (serenity::Permissions::MANAGE_CHANNELS, "Manage Channels"),
    (serenity::Permissions::MANAGE_ROLES, "Manage Roles"),
    (serenity::Permissions::MANAGE_MESSAGES, "Manage Messages"),
    (serenity::Permissions::SEND_MESSAGES, "Send Messages"),
    (serenity::Permissions::VIEW_CHANNEL, "View Channel"),
];

/// Labels of the moderation-relevant permissions present in `perms`.
pub fn key_channel_permissions(perms: serenity::Permissions) -> Vec<&'static str> {
    KEY_CHANNEL_PERMISSIONS
        .iter()
        .filter(|(flag, _)| perms.contains(*flag))
        .map(|(_, label)| *label)
        .collect()
}

/// Permission bundles that `editrole` can apply wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionPreset {
    Admin,
    Text,
    Voice,
}

impl PermissionPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "text" => Some(Self::Text),
            "voice" => Some(Self::Voice),
            _ => None,
        }
    }

    pub fn permissions(self) -> serenity::Permissions {
        match self {
            Self::Admin => serenity::Permissions::ADMINISTRATOR,
            Self::Text => {
                serenity::Permissions::VIEW_CHANNEL
                    | serenity::Permissions::SEND_MESSAGES
                    | serenity::Permissions::EMBED_LINKS
                    | serenity::Permissions::ATTACH_FILES
                    | serenity::Permissions::ADD_REACTIONS
                    | serenity::Permissions::READ_MESSAGE_HISTORY
                    | serenity::Permissions::MENTION_EVERYONE
            }
            Self::Voice => {
                serenity::Permissions::VIEW_CHANNEL
                    | serenity::Permissions::CONNECT
                    | serenity::Permissions::SPEAK
                    | serenity::Permissions::STREAM
                    | serenity::Permissions::USE_VAD
                    | serenity::Permissions::MUTE_MEMBERS
                    | serenity::Permissions::DEAFEN_MEMBERS
                    | serenity::Permissions::MOVE_MEMBERS
            }
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Admin => "Administrator (Full Control)",
            Self::Text => "Text Channel Permissions",
            Self::Voice => "Voice Channel Permissions",
        }
    }
}

/// Resolve a member's effective guild-level permissions.
///
/// The guild owner implicitly holds every permission.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild: &serenity::PartialGuild,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild.id.member(http, user_id).await?;
    let everyone_role_id = serenity::RoleId::new(guild.id.get());

    let mut resolved = serenity::Permissions::empty();
    for role in guild.roles.values() {
        if role.id == everyone_role_id || member.roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{PermissionPreset, key_channel_permissions, permission_names};

    #[test]
    fn administrator_collapses_names() {
        let perms = serenity::Permissions::ADMINISTRATOR | serenity::Permissions::SEND_MESSAGES;
        assert_eq!(permission_names(perms), vec!["ADMINISTRATOR".to_owned()]);
    }

    #[test]
    fn key_permissions_keep_display_order() {
        let perms = serenity::Permissions::VIEW_CHANNEL
            | serenity::Permissions::SEND_MESSAGES
            | serenity::Permissions::MANAGE_ROLES;
        assert_eq!(
            key_channel_permissions(perms),
            vec!["Manage Roles", "Send Messages", "View Channel"]
        );
        assert!(key_channel_permissions(serenity::Permissions::empty()).is_empty());
    }

    #[test]
    fn presets_parse_case_insensitively() {
        assert_eq!(PermissionPreset::parse("ADMIN"), Some(PermissionPreset::Admin));
        assert_eq!(PermissionPreset::parse(" voice "), Some(PermissionPreset::Voice));
        assert_eq!(PermissionPreset::parse("color"), None);
    }

    #[test]
    fn voice_preset_does_not_grant_text_permissions() {
        let voice = PermissionPreset::Voice.permissions();
        assert!(voice.contains(serenity::Permissions::CONNECT));
        assert!(!voice.contains(serenity::Permissions::SEND_MESSAGES));
        assert_eq!(
            PermissionPreset::Admin.permissions(),
            serenity::Permissions::ADMINISTRATOR
        );
    }
}
