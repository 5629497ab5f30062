pub mod audit;
pub mod channels;
pub mod registration;
pub mod roles;
pub mod session;
pub mod utility;

use std::collections::HashMap;
use std::sync::LazyLock;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use bastion_core::dispatch::{
    CommandInvocation, DispatchMessages, InvocationStyle, OptionValue, Router,
};
use bastion_core::{Data, Error};
use bastion_utils::split_command;

use crate::session::{CommandSession, Source, resolve_actor};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

/// Help entries for every prefix command.
pub fn commands() -> impl Iterator<Item = &'static CommandMeta> {
    channels::HELP
        .iter()
        .chain(roles::HELP)
        .chain(utility::HELP)
}

/// Prefix (`!`) commands.
pub static TEXT_ROUTER: LazyLock<Router<CommandSession>> = LazyLock::new(|| {
    Router::new(vec![
        channels::text_dispatcher(),
        roles::text_dispatcher(),
        utility::messaging_dispatcher(),
        utility::text_dispatcher(),
    ])
});

/// Slash commands.
pub static SLASH_ROUTER: LazyLock<Router<CommandSession>> = LazyLock::new(|| {
    Router::new(vec![
        channels::structured_dispatcher(),
        roles::structured_dispatcher(),
        utility::structured_dispatcher(),
    ])
});

pub async fn handle_message(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };
    let Some((name, tokens)) = split_command(&message.content) else {
        return Ok(());
    };
    if !TEXT_ROUTER.recognizes(&name) {
        return Ok(());
    }

    let actor = match resolve_actor(
        ctx,
        &data.settings,
        guild_id,
        message.channel_id,
        message.author.id,
        None,
    )
    .await
    {
        Ok(actor) => actor,
        Err(source) => {
            error!(?source, command = %name, guild_id = %guild_id, "failed to resolve command author");
            message
                .reply(ctx, actor_failure_notice(InvocationStyle::Text, &source))
                .await?;
            return Ok(());
        }
    };

    let session = CommandSession::new(
        ctx.clone(),
        data.clone(),
        CommandInvocation::text(name.clone(), tokens, actor),
        Source::Message(Box::new(message.clone())),
    );
    let outcome = TEXT_ROUTER.dispatch(&name, &session, &data.policy()).await;
    debug!(
        command = %name,
        user_id = %message.author.id,
        guild_id = %guild_id,
        ?outcome,
        "Prefix command dispatched"
    );

    Ok(())
}

pub async fn handle_interaction(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::CommandInteraction,
) -> Result<(), Error> {
    let name = interaction.data.name.to_ascii_lowercase();

    let Some(guild_id) = interaction.guild_id else {
        reply_ephemeral(ctx, interaction, "❌ This command can only be used in a server.").await?;
        return Ok(());
    };
    if !SLASH_ROUTER.recognizes(&name) {
        warn!(command = %name, "Received unknown slash command");
        reply_ephemeral(ctx, interaction, "❌ Unknown command").await?;
        return Ok(());
    }

    let permissions = interaction
        .member
        .as_ref()
        .and_then(|member| member.permissions);
    let actor = match resolve_actor(
        ctx,
        &data.settings,
        guild_id,
        interaction.channel_id,
        interaction.user.id,
        permissions,
    )
    .await
    {
        Ok(actor) => actor,
        Err(source) => {
            error!(?source, command = %name, guild_id = %guild_id, "failed to resolve command author");
            let notice = actor_failure_notice(InvocationStyle::Structured, &source);
            reply_ephemeral(ctx, interaction, &notice).await?;
            return Ok(());
        }
    };

    let session = CommandSession::new(
        ctx.clone(),
        data.clone(),
        CommandInvocation::structured(name.clone(), interaction_options(interaction), actor),
        Source::Interaction(Box::new(interaction.clone())),
    );
    let outcome = SLASH_ROUTER.dispatch(&name, &session, &data.policy()).await;
    debug!(
        command = %name,
        user_id = %interaction.user.id,
        guild_id = %guild_id,
        ?outcome,
        "Slash command dispatched"
    );

    Ok(())
}

/// Reply sent when a recognized command fails before reaching its dispatcher.
fn actor_failure_notice(style: InvocationStyle, source: &Error) -> String {
    DispatchMessages::for_style(style).failure(source)
}

fn interaction_options(interaction: &serenity::CommandInteraction) -> HashMap<String, OptionValue> {
    interaction
        .data
        .options()
        .into_iter()
        .filter_map(|option| {
            let value = match option.value {
                serenity::ResolvedValue::String(value) => OptionValue::String(value.to_owned()),
                serenity::ResolvedValue::Boolean(value) => OptionValue::Boolean(value),
                serenity::ResolvedValue::User(user, _) => OptionValue::User(user.id),
                serenity::ResolvedValue::Role(role) => OptionValue::Role(role.id),
                serenity::ResolvedValue::Channel(channel) => OptionValue::Channel(channel.id),
                _ => return None,
            };
            Some((option.name.to_owned(), value))
        })
        .collect()
}

async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::CommandInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            ctx,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use bastion_core::Error;
    use bastion_core::dispatch::InvocationStyle;

    use super::{SLASH_ROUTER, TEXT_ROUTER, actor_failure_notice, commands};

    #[test]
    fn routers_do_not_shadow_each_other() {
        for router in [&*TEXT_ROUTER, &*SLASH_ROUTER] {
            let mut seen = HashSet::new();
            for dispatcher in router.dispatchers() {
                for name in dispatcher.canonical_names() {
                    assert!(seen.insert(name), "{name} is bound twice");
                }
            }
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert!(TEXT_ROUTER.recognizes("LOCKTEXT"));
        assert!(TEXT_ROUTER.recognizes("ui"));
        assert!(TEXT_ROUTER.recognizes("rar"));
        assert!(!TEXT_ROUTER.recognizes("ban"));
        assert!(SLASH_ROUTER.recognizes("lockall"));
        assert!(!SLASH_ROUTER.recognizes("j2c"));
    }

    #[test]
    fn help_entries_are_unique() {
        let mut seen = HashSet::new();
        for command in commands() {
            assert!(seen.insert(command.name), "duplicate help entry {}", command.name);
        }
    }

    #[test]
    fn unresolved_author_gets_an_error_reply() {
        let source = Error::msg("Unknown Guild");
        assert_eq!(
            actor_failure_notice(InvocationStyle::Text, &source),
            "❌ Error: Unknown Guild"
        );
        assert_eq!(
            actor_failure_notice(InvocationStyle::Structured, &source),
            "❌ Error: Unknown Guild"
        );
    }
}
