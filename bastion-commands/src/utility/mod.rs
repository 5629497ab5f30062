pub mod about;
pub mod dm;
pub mod help;
pub mod ping;
pub mod profile;
pub mod server;
pub mod stats;
pub mod userinfo;

use bastion_core::AccessRule;
use bastion_core::dispatch::{CommandDispatcher, InvocationStyle};

use crate::CommandMeta;
use crate::session::CommandSession;

pub const HELP: &[CommandMeta] = &[
    CommandMeta {
        name: "ping",
        desc: "Show bot and API latency.",
        category: "utility",
        usage: "!ping",
    },
    CommandMeta {
        name: "dev",
        desc: "About this bot.",
        category: "utility",
        usage: "!dev",
    },
    CommandMeta {
        name: "userinfo",
        desc: "Show account and membership details for a user.",
        category: "utility",
        usage: "!userinfo [@user]",
    },
    CommandMeta {
        name: "help",
        desc: "Lists out all available commands.",
        category: "utility",
        usage: "!help [page|category]",
    },
    CommandMeta {
        name: "dm",
        desc: "Send a direct message to a member on behalf of the staff.",
        category: "messaging",
        usage: "!dm <@user> <message...>",
    },
];

pub fn text_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("utility", InvocationStyle::Text, AccessRule::Public)
        .command("ping", &[], |s| Box::pin(ping::ping(s)))
        .command("dev", &["about"], |s| Box::pin(about::about(s)))
        .command("userinfo", &["ui"], |s| Box::pin(userinfo::userinfo(s)))
        .command("help", &[], |s| Box::pin(help::help(s)))
}

pub fn messaging_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("messaging", InvocationStyle::Text, AccessRule::Text)
        .command("dm", &[], |s| Box::pin(dm::dm(s)))
}

pub fn structured_dispatcher() -> CommandDispatcher<CommandSession> {
    CommandDispatcher::new("utility", InvocationStyle::Structured, AccessRule::Public)
        .command("serverinfo", &[], |s| Box::pin(server::server_info(s)))
        .command("avatar", &[], |s| Box::pin(profile::avatar(s)))
        .command("banner", &[], |s| Box::pin(profile::banner(s)))
        .command("rolecolor", &[], |s| Box::pin(profile::role_color(s)))
        .command("membercount", &[], |s| Box::pin(server::member_count(s)))
        .command("botstats", &[], |s| Box::pin(stats::bot_stats(s)))
        .command("invite", &[], |s| Box::pin(stats::invite(s)))
        .command("uptime", &[], |s| Box::pin(stats::uptime(s)))
        .command("emojis", &[], |s| Box::pin(server::emojis(s)))
        .command("stickers", &[], |s| Box::pin(server::stickers(s)))
        .command("boosters", &[], |s| Box::pin(server::boosters(s)))
}
