//! Channel management: permission toggles, channel settings, voice controls
//! and per-guild channel configuration.

pub mod config;
pub mod info;
pub mod maintenance;
pub mod overwrite;
pub mod settings;
pub mod voice;

use poise::serenity_prelude as serenity;

use bastion_core::dispatch::{CommandDispatcher, InvocationStyle};
use bastion_core::{AccessRule, Error};

use crate::CommandMeta;
use crate::session::CommandSession;
use overwrite::Overwrite;

pub const HELP: &[CommandMeta] = &[
    CommandMeta {
        name: "lock",
        desc: "Stop @everyone from sending messages here.",
        category: "channels",
        usage: "!lock",
    },
    CommandMeta {
        name: "unlock",
        desc: "Let @everyone send messages here again.",
        category: "channels",
        usage: "!unlock",
    },
    CommandMeta {
        name: "hide",
        desc: "Hide this channel from @everyone.",
        category: "channels",
        usage: "!hide",
    },
    CommandMeta {
        name: "show",
        desc: "Make this channel visible to @everyone.",
        category: "channels",
        usage: "!show",
    },
    CommandMeta {
        name: "slowmode",
        desc: "Set the slowmode delay in seconds.",
        category: "channels",
        usage: "!slowmode <0-21600>",
    },
    CommandMeta {
        name: "rename",
        desc: "Rename this channel.",
        category: "channels",
        usage: "!rename <name...>",
    },
    CommandMeta {
        name: "topic",
        desc: "Set this channel's topic.",
        category: "channels",
        usage: "!topic <text...>",
    },
    CommandMeta {
        name: "lockvc",
        desc: "Stop @everyone from joining a voice channel.",
        category: "channels",
        usage: "!lockvc <#voice>",
    },
    CommandMeta {
        name: "unlockvc",
        desc: "Let @everyone join a voice channel again.",
        category: "channels",
        usage: "!unlockvc <#voice>",
    },
    CommandMeta {
        name: "hidevc",
        desc: "Hide a voice channel from @everyone.",
        category: "channels",
        usage: "!hidevc <#voice>",
    },
    CommandMeta {
        name: "showvc",
        desc: "Make a voice channel visible to @everyone.",
        category: "channels",
        usage: "!showvc <#voice>",
    },
    CommandMeta {
        name: "limit",
        desc: "Set a voice channel's user limit (0 = unlimited).",
        category: "channels",
        usage: "!limit <#voice> <0-99>",
    },
    CommandMeta {
        name: "bitrate",
        desc: "Set a voice channel's bitrate in kbps.",
        category: "channels",
        usage: "!bitrate <#voice> <8-384>",
    },
    CommandMeta {
        name: "j2c",
        desc: "Use a voice channel as the join-to-create trigger.",
        category: "channels",
        usage: "!j2c <#voice>",
    },
    CommandMeta {
        name: "removej2c",
        desc: "Disable join-to-create.",
        category: "channels",
        usage: "!removej2c",
    },
    CommandMeta {
        name: "adminchannel",
        desc: "Set or view the channel where administrators may run commands.",
        category: "channels",
        usage: "!adminchannel [#channel|clear]",
    },
    CommandMeta {
        name: "logchannel",
        desc: "Set or view the audit-log channel.",
        category: "channels",
        usage: "!logchannel [#channel|clear]",
    },
    CommandMeta {
        name: "permissions",
        desc: "Show a member's key permissions in this channel.",
        category: "channels",
        usage: "!permissions [@user]",
    },
    CommandMeta {
        name: "channels",
        desc: "Count the server's channels by type.",
        category: "channels",
        usage: "!channels",
    },
];

pub fn text_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("channels", InvocationStyle::Text, AccessRule::Text)
        .command("lock", &["locktext"], |s| {
            Box::pin(overwrite::toggle_current(s, &overwrite::LOCK))
        })
        .command("unlock", &["unlocktext", "open", "opentext"], |s| {
            Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK))
        })
        .command("hide", &["hidechannel"], |s| {
            Box::pin(overwrite::toggle_current(s, &overwrite::HIDE))
        })
        .command("show", &["showchannel", "reveal"], |s| {
            Box::pin(overwrite::toggle_current(s, &overwrite::SHOW))
        })
        .command("slowmode", &["slow"], |s| Box::pin(settings::slowmode(s)))
        .command("rename", &["renamechannel"], |s| Box::pin(settings::rename(s)))
        .command("topic", &["settopic"], |s| Box::pin(settings::topic(s)))
        .command("lockvc", &["lockvoice", "mutevc"], |s| {
            Box::pin(overwrite::toggle_voice(s, &overwrite::LOCK_VOICE))
        })
        .command("unlockvc", &["unlockvoice", "openvc"], |s| {
            Box::pin(overwrite::toggle_voice(s, &overwrite::UNLOCK_VOICE))
        })
        .command("hidevc", &["hidevoice"], |s| {
            Box::pin(overwrite::toggle_voice(s, &overwrite::HIDE_VOICE))
        })
        .command("showvc", &["showvoice", "revealvc"], |s| {
            Box::pin(overwrite::toggle_voice(s, &overwrite::SHOW_VOICE))
        })
        .command("limit", &["userlimit"], |s| Box::pin(voice::user_limit(s)))
        .command("bitrate", &["setbitrate"], |s| Box::pin(voice::bitrate(s)))
        .command("j2c", &["join2create", "setupj2c"], |s| {
            Box::pin(config::enable_join_to_create(s))
        })
        .command("removej2c", &["disablej2c"], |s| {
            Box::pin(config::disable_join_to_create(s))
        })
        .command("adminchannel", &[], |s| Box::pin(config::admin_channel(s)))
        .command("logchannel", &[], |s| Box::pin(config::log_channel(s)))
        .command("permissions", &["perms"], |s| Box::pin(info::permissions(s)))
        .command("channels", &["listchannels"], |s| Box::pin(info::channels(s)))
}

pub fn structured_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new(
        "channels",
        InvocationStyle::Structured,
        AccessRule::Structured,
    )
    .command("lock", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::LOCK))
    })
    .command("unlock", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK))
    })
    .command("hide", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::HIDE))
    })
    .command("show", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::SHOW))
    })
    .command("lockvc", &[], |s| {
        Box::pin(overwrite::toggle_voice(s, &overwrite::LOCK_VOICE))
    })
    .command("unlockvc", &[], |s| {
        Box::pin(overwrite::toggle_voice(s, &overwrite::UNLOCK_VOICE))
    })
    .command("locklinks", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::LOCK_LINKS))
    })
    .command("unlocklinks", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK_LINKS))
    })
    .command("lockembeds", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::LOCK_EMBEDS))
    })
    .command("unlockembeds", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK_EMBEDS))
    })
    .command("lockattachments", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::LOCK_ATTACHMENTS))
    })
    .command("unlockattachments", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK_ATTACHMENTS))
    })
    .command("lockreactions", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::LOCK_REACTIONS))
    })
    .command("unlockreactions", &[], |s| {
        Box::pin(overwrite::toggle_current(s, &overwrite::UNLOCK_REACTIONS))
    })
    .command("lockall", &[], |s| {
        Box::pin(overwrite::lockdown(s, Overwrite::Deny))
    })
    .command("unlockall", &[], |s| {
        Box::pin(overwrite::lockdown(s, Overwrite::Inherit))
    })
    .command("nuke", &[], |s| Box::pin(maintenance::nuke(s)))
    .command("clone", &[], |s| Box::pin(maintenance::clone(s)))
    .command("setnsfw", &[], |s| Box::pin(settings::set_nsfw(s)))
    .command("announce", &[], |s| Box::pin(settings::announce(s)))
}

/// Fetch a channel and keep it only if it is a channel of the invoking guild.
pub async fn fetch_guild_channel(
    session: &CommandSession,
    channel_id: serenity::ChannelId,
) -> Result<Option<serenity::GuildChannel>, Error> {
    let channel = channel_id.to_channel(session.http()).await?;
    Ok(channel
        .guild()
        .filter(|channel| channel.guild_id == session.guild_id()))
}

/// Resolve a voice channel argument, replying with a validation message when
/// it is missing or not a voice channel of this guild.
pub async fn require_voice_channel(
    session: &CommandSession,
    channel_id: Option<serenity::ChannelId>,
) -> Result<Option<serenity::GuildChannel>, Error> {
    let channel = match channel_id {
        Some(channel_id) => fetch_guild_channel(session, channel_id)
            .await
            .ok()
            .flatten()
            .filter(|channel| channel.kind == serenity::ChannelType::Voice),
        None => None,
    };

    if channel.is_none() {
        session
            .say("❌ Please mention a valid voice channel.")
            .await?;
    }

    Ok(channel)
}
