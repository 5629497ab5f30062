//! Slash command definitions pushed to Discord at startup.
//!
//! Each entry's name must match a canonical command in the structured router;
//! option names match what the handlers read from the session.

use poise::serenity_prelude as serenity;
use poise::serenity_prelude::CommandOptionType as Kind;

pub struct SlashOption {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: Kind,
    pub required: bool,
    /// Restrict the channel picker to voice channels.
    pub voice_only: bool,
}

pub struct SlashCommand {
    pub name: &'static str,
    pub description: &'static str,
    pub options: &'static [SlashOption],
}

const fn required(name: &'static str, description: &'static str, kind: Kind) -> SlashOption {
    SlashOption {
        name,
        description,
        kind,
        required: true,
        voice_only: false,
    }
}

const fn optional(name: &'static str, description: &'static str, kind: Kind) -> SlashOption {
    SlashOption {
        name,
        description,
        kind,
        required: false,
        voice_only: false,
    }
}

const VOICE_CHANNEL: &[SlashOption] = &[SlashOption {
    name: "channel",
    description: "Voice channel",
    kind: Kind::Channel,
    required: true,
    voice_only: true,
}];
const TARGET_USER: &[SlashOption] = &[required("user", "Target member", Kind::User)];
const OPTIONAL_USER: &[SlashOption] = &[optional("user", "User to look up (defaults to you)", Kind::User)];
const TARGET_ROLE: &[SlashOption] = &[required("role", "Target role", Kind::Role)];
const USER_AND_ROLE: &[SlashOption] = &[
    required("user", "Target member", Kind::User),
    required("role", "Role to change", Kind::Role),
];

const fn bare(name: &'static str, description: &'static str) -> SlashCommand {
    SlashCommand {
        name,
        description,
        options: &[],
    }
}

pub const SLASH_COMMANDS: &[SlashCommand] = &[
    bare("lock", "Lock this channel for @everyone"),
    bare("unlock", "Unlock this channel for @everyone"),
    bare("hide", "Hide this channel from @everyone"),
    bare("show", "Show this channel to @everyone"),
    SlashCommand {
        name: "lockvc",
        description: "Stop @everyone from joining a voice channel",
        options: VOICE_CHANNEL,
    },
    SlashCommand {
        name: "unlockvc",
        description: "Let @everyone join a voice channel again",
        options: VOICE_CHANNEL,
    },
    bare("locklinks", "Block link embeds in this channel"),
    bare("unlocklinks", "Allow link embeds in this channel"),
    bare("lockembeds", "Block embeds in this channel"),
    bare("unlockembeds", "Allow embeds in this channel"),
    bare("lockattachments", "Block file uploads in this channel"),
    bare("unlockattachments", "Allow file uploads in this channel"),
    bare("lockreactions", "Block new reactions in this channel"),
    bare("unlockreactions", "Allow new reactions in this channel"),
    bare("lockall", "Lock every text channel in the server"),
    bare("unlockall", "Unlock every text channel in the server"),
    bare("nuke", "Recreate this channel, wiping its history"),
    bare("clone", "Create a copy of this channel"),
    SlashCommand {
        name: "setnsfw",
        description: "Mark this channel as NSFW or not",
        options: &[required("enabled", "Whether the channel is NSFW", Kind::Boolean)],
    },
    SlashCommand {
        name: "announce",
        description: "Post an announcement embed in this channel",
        options: &[
            required("title", "Announcement title", Kind::String),
            required("message", "Announcement body", Kind::String),
            optional("color", "Hex color such as #FF0000", Kind::String),
        ],
    },
    SlashCommand {
        name: "addrole",
        description: "Give a role to a member",
        options: USER_AND_ROLE,
    },
    SlashCommand {
        name: "removerole",
        description: "Take a role from a member",
        options: USER_AND_ROLE,
    },
    SlashCommand {
        name: "createrole",
        description: "Create a new role",
        options: &[
            required("name", "Role name", Kind::String),
            optional("color", "Hex color such as #FF0000", Kind::String),
        ],
    },
    SlashCommand {
        name: "deleterole",
        description: "Delete a role",
        options: TARGET_ROLE,
    },
    SlashCommand {
        name: "editrole",
        description: "Rename, recolor or apply a permission preset to a role",
        options: &[
            required("role", "Role to edit", Kind::Role),
            required("property", "name, color, admin, text or voice", Kind::String),
            optional("value", "New name or hex color", Kind::String),
        ],
    },
    SlashCommand {
        name: "roleinfo",
        description: "Show details about a role",
        options: TARGET_ROLE,
    },
    bare("roles", "List every role in the server"),
    SlashCommand {
        name: "inrole",
        description: "List members holding a role",
        options: TARGET_ROLE,
    },
    SlashCommand {
        name: "removeallroles",
        description: "Strip every role from a member",
        options: TARGET_USER,
    },
    SlashCommand {
        name: "roleall",
        description: "Give a role to every member holding another role",
        options: &[
            required("source_role", "Members with this role", Kind::Role),
            required("target_role", "Role to give them", Kind::Role),
        ],
    },
    bare("serverinfo", "Show information about this server"),
    SlashCommand {
        name: "avatar",
        description: "Show a user's avatar",
        options: OPTIONAL_USER,
    },
    SlashCommand {
        name: "banner",
        description: "Show a user's profile banner",
        options: OPTIONAL_USER,
    },
    SlashCommand {
        name: "rolecolor",
        description: "Show a role's color values",
        options: TARGET_ROLE,
    },
    bare("membercount", "Count humans and bots in this server"),
    bare("botstats", "Show bot statistics"),
    bare("invite", "Get the bot's invite link"),
    bare("uptime", "Show how long the bot has been running"),
    bare("emojis", "List this server's custom emojis"),
    bare("stickers", "List this server's custom stickers"),
    bare("boosters", "List this server's boosters"),
];

impl SlashOption {
    fn build(&self) -> serenity::CreateCommandOption {
        let option = serenity::CreateCommandOption::new(self.kind, self.name, self.description)
            .required(self.required);
        if self.voice_only {
            option.channel_types(vec![serenity::ChannelType::Voice])
        } else {
            option
        }
    }
}

impl SlashCommand {
    fn build(&self) -> serenity::CreateCommand {
        let command = serenity::CreateCommand::new(self.name)
            .description(self.description)
            .dm_permission(false);
        self.options
            .iter()
            .fold(command, |command, option| command.add_option(option.build()))
    }
}

pub fn slash_commands() -> Vec<serenity::CreateCommand> {
    SLASH_COMMANDS.iter().map(SlashCommand::build).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::SLASH_COMMANDS;
    use crate::SLASH_ROUTER;

    #[test]
    fn table_matches_structured_router() {
        let registered: HashSet<&str> = SLASH_COMMANDS.iter().map(|command| command.name).collect();
        assert_eq!(registered.len(), SLASH_COMMANDS.len(), "duplicate slash command");

        let routed: HashSet<&str> = SLASH_ROUTER
            .dispatchers()
            .iter()
            .flat_map(|dispatcher| dispatcher.canonical_names())
            .collect();
        assert_eq!(registered, routed);
    }

    #[test]
    fn definitions_fit_discord_limits() {
        for command in SLASH_COMMANDS {
            assert!(command.name.len() <= 32, "{}", command.name);
            assert!(!command.description.is_empty() && command.description.len() <= 100);
            assert!(command.options.len() <= 25);

            let mut seen_optional = false;
            for option in command.options {
                assert!(option.name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
                // Required options must come before optional ones.
                assert!(!(seen_optional && option.required), "{}", command.name);
                seen_optional |= !option.required;
            }
        }
    }
}
