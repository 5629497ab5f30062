use std::sync::Mutex;

use poise::BoxFuture;
use poise::serenity_prelude as serenity;

use bastion_core::dispatch::{
    CommandInvocation, InvocationStyle, Notice, ResponseState, Session,
};
use bastion_core::{ActorContext, Data, Error, Settings};
use bastion_database::GuildConfig;
use bastion_utils::parse::{parse_channel_id, parse_role_id, parse_user_id};
use bastion_utils::permissions::resolve_user_permissions;

/// The inbound event an invocation came from.
pub enum Source {
    Message(Box<serenity::Message>),
    Interaction(Box<serenity::CommandInteraction>),
}

/// One outgoing response: text, an embed, or both.
#[derive(Clone, Debug, Default)]
pub struct Outgoing {
    content: Option<String>,
    embed: Option<serenity::CreateEmbed>,
    ephemeral: bool,
}

impl Outgoing {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: serenity::CreateEmbed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    /// Only honoured for slash commands; prefix replies are always public.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }
}

impl From<Notice> for Outgoing {
    fn from(notice: Notice) -> Self {
        Self {
            content: Some(notice.content),
            embed: None,
            ephemeral: notice.ephemeral,
        }
    }
}

pub struct CommandSession {
    pub ctx: serenity::Context,
    pub data: Data,
    invocation: CommandInvocation,
    source: Source,
    state: Mutex<ResponseState>,
    /// Placeholder message posted when a prefix command defers.
    progress: Mutex<Option<serenity::MessageId>>,
}

impl CommandSession {
    pub fn new(
        ctx: serenity::Context,
        data: Data,
        invocation: CommandInvocation,
        source: Source,
    ) -> Self {
        Self {
            ctx,
            data,
            invocation,
            source,
            state: Mutex::new(ResponseState::Pending),
            progress: Mutex::new(None),
        }
    }

    pub fn http(&self) -> &serenity::Http {
        &self.ctx.http
    }

    pub fn actor(&self) -> &ActorContext {
        &self.invocation.actor
    }

    pub fn guild_id(&self) -> serenity::GuildId {
        self.invocation.actor.guild_id
    }

    pub fn channel_id(&self) -> serenity::ChannelId {
        self.invocation.actor.channel_id
    }

    pub fn author(&self) -> &serenity::User {
        match &self.source {
            Source::Message(message) => &message.author,
            Source::Interaction(interaction) => &interaction.user,
        }
    }

    pub fn style(&self) -> InvocationStyle {
        self.invocation.style()
    }

    /// Snowflake of the triggering message or interaction.
    pub fn source_id(&self) -> u64 {
        match &self.source {
            Source::Message(message) => message.id.get(),
            Source::Interaction(interaction) => interaction.id.get(),
        }
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.invocation.token(index)
    }

    /// Named string option; always `None` for prefix commands.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.invocation
            .string_option(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn bool_option(&self, name: &str) -> Option<bool> {
        self.invocation.boolean_option(name)
    }

    /// Channel argument: the token at `index` for prefix commands, the named option otherwise.
    pub fn channel_arg(&self, index: usize, option: &str) -> Option<serenity::ChannelId> {
        match self.style() {
            InvocationStyle::Text => self
                .invocation
                .token(index)
                .and_then(parse_channel_id)
                .map(serenity::ChannelId::new),
            InvocationStyle::Structured => self.invocation.channel_option(option),
        }
    }

    pub fn role_arg(&self, index: usize, option: &str) -> Option<serenity::RoleId> {
        match self.style() {
            InvocationStyle::Text => self
                .invocation
                .token(index)
                .and_then(parse_role_id)
                .map(serenity::RoleId::new),
            InvocationStyle::Structured => self.invocation.role_option(option),
        }
    }

    pub fn user_arg(&self, index: usize, option: &str) -> Option<serenity::UserId> {
        match self.style() {
            InvocationStyle::Text => self
                .invocation
                .token(index)
                .and_then(parse_user_id)
                .map(serenity::UserId::new),
            InvocationStyle::Structured => self.invocation.user_option(option),
        }
    }

    /// Free text argument: tokens from `start` joined by `separator`, or the named option.
    pub fn text_arg(&self, start: usize, separator: &str, option: &str) -> Option<String> {
        let raw = match self.style() {
            InvocationStyle::Text => self.invocation.rest(start, separator),
            InvocationStyle::Structured => self
                .invocation
                .string_option(option)
                .unwrap_or_default()
                .to_owned(),
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    pub async fn say(&self, content: impl Into<String>) -> Result<(), Error> {
        self.send(Outgoing::text(content)).await
    }

    pub async fn send_embed(&self, embed: serenity::CreateEmbed) -> Result<(), Error> {
        self.send(Outgoing::embed(embed)).await
    }

    /// Acknowledge a slow command. Prefix commands get a visible placeholder
    /// that the next [`Self::send`] replaces.
    pub async fn defer(&self, ephemeral: bool, progress: &str) -> Result<(), Error> {
        match &self.source {
            Source::Message(message) => {
                let placeholder = message.reply(self.http(), progress).await?;
                *lock(&self.progress) = Some(placeholder.id);
            }
            Source::Interaction(interaction) => {
                if ephemeral {
                    interaction.defer_ephemeral(self.http()).await?;
                } else {
                    interaction.defer(self.http()).await?;
                }
            }
        }

        self.set_state(ResponseState::Deferred);
        Ok(())
    }

    /// Send the primary response, editing the deferred placeholder when there is one.
    pub async fn send(&self, outgoing: Outgoing) -> Result<(), Error> {
        match self.response_state() {
            ResponseState::Pending => self.create(outgoing).await?,
            ResponseState::Deferred => self.edit_deferred(outgoing).await?,
            ResponseState::Replied => self.follow(outgoing).await?,
        }

        self.set_state(ResponseState::Replied);
        Ok(())
    }

    async fn create(&self, outgoing: Outgoing) -> Result<(), Error> {
        match &self.source {
            Source::Message(message) => {
                let mut builder =
                    serenity::CreateMessage::new().reference_message(&**message);
                if let Some(content) = outgoing.content {
                    builder = builder.content(content);
                }
                if let Some(embed) = outgoing.embed {
                    builder = builder.embed(embed);
                }
                message.channel_id.send_message(self.http(), builder).await?;
            }
            Source::Interaction(interaction) => {
                let mut builder =
                    serenity::CreateInteractionResponseMessage::new().ephemeral(outgoing.ephemeral);
                if let Some(content) = outgoing.content {
                    builder = builder.content(content);
                }
                if let Some(embed) = outgoing.embed {
                    builder = builder.embed(embed);
                }
                interaction
                    .create_response(
                        self.http(),
                        serenity::CreateInteractionResponse::Message(builder),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn edit_deferred(&self, outgoing: Outgoing) -> Result<(), Error> {
        match &self.source {
            Source::Message(message) => {
                let Some(placeholder) = claim_placeholder(&self.progress) else {
                    return self.create(outgoing).await;
                };
                self.edit_placeholder(message.channel_id, placeholder, outgoing)
                    .await?;
            }
            Source::Interaction(interaction) => {
                let mut builder = serenity::EditInteractionResponse::new();
                if let Some(content) = outgoing.content {
                    builder = builder.content(content);
                }
                if let Some(embed) = outgoing.embed {
                    builder = builder.embed(embed);
                }
                interaction.edit_response(self.http(), builder).await?;
            }
        }
        Ok(())
    }

    async fn follow(&self, outgoing: Outgoing) -> Result<(), Error> {
        match &self.source {
            Source::Message(message) => {
                if let Some(placeholder) = claim_placeholder(&self.progress) {
                    return self
                        .edit_placeholder(message.channel_id, placeholder, outgoing)
                        .await;
                }

                let mut builder = serenity::CreateMessage::new();
                if let Some(content) = outgoing.content {
                    builder = builder.content(content);
                }
                if let Some(embed) = outgoing.embed {
                    builder = builder.embed(embed);
                }
                message.channel_id.send_message(self.http(), builder).await?;
            }
            Source::Interaction(interaction) => {
                let mut builder =
                    serenity::CreateInteractionResponseFollowup::new().ephemeral(outgoing.ephemeral);
                if let Some(content) = outgoing.content {
                    builder = builder.content(content);
                }
                if let Some(embed) = outgoing.embed {
                    builder = builder.embed(embed);
                }
                interaction.create_followup(self.http(), builder).await?;
            }
        }
        Ok(())
    }

    async fn edit_placeholder(
        &self,
        channel_id: serenity::ChannelId,
        placeholder: serenity::MessageId,
        outgoing: Outgoing,
    ) -> Result<(), Error> {
        let mut builder =
            serenity::EditMessage::new().content(outgoing.content.unwrap_or_default());
        if let Some(embed) = outgoing.embed {
            builder = builder.embed(embed);
        }
        channel_id
            .edit_message(self.http(), placeholder, builder)
            .await?;
        Ok(())
    }

    fn set_state(&self, state: ResponseState) {
        *lock(&self.state) = state;
    }
}

impl Session for CommandSession {
    fn invocation(&self) -> &CommandInvocation {
        &self.invocation
    }

    fn guild_config(&self) -> BoxFuture<'_, Result<Option<GuildConfig>, Error>> {
        Box::pin(self.data.configs.get(self.guild_id().get()))
    }

    fn response_state(&self) -> ResponseState {
        *lock(&self.state)
    }

    fn reply(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(self.send(notice.into()))
    }

    fn follow_up(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            self.follow(notice.into()).await?;
            self.set_state(ResponseState::Replied);
            Ok(())
        })
    }
}

/// The pending "⏳ Processing..." message, handed out at most once so only the
/// first response after a defer replaces it.
fn claim_placeholder(
    progress: &Mutex<Option<serenity::MessageId>>,
) -> Option<serenity::MessageId> {
    lock(progress).take()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resolve the actor for one invocation.
///
/// `permissions` is the interaction's pre-computed member permission set; prefix
/// commands pass `None` and have it resolved from the member's roles.
pub async fn resolve_actor(
    ctx: &serenity::Context,
    settings: &Settings,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    user_id: serenity::UserId,
    permissions: Option<serenity::Permissions>,
) -> Result<ActorContext, Error> {
    let guild = guild_id.to_partial_guild(ctx).await?;
    let permissions = match permissions {
        Some(permissions) => permissions,
        None => resolve_user_permissions(&ctx.http, &guild, user_id).await?,
    };

    Ok(ActorContext::resolve(
        settings,
        user_id,
        guild_id,
        guild.owner_id,
        channel_id,
        permissions,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use poise::serenity_prelude as serenity;

    use super::claim_placeholder;

    #[test]
    fn placeholder_is_replaced_only_once() {
        let progress = Mutex::new(Some(serenity::MessageId::new(42)));
        assert_eq!(
            claim_placeholder(&progress),
            Some(serenity::MessageId::new(42))
        );
        assert_eq!(claim_placeholder(&progress), None);
    }

    #[test]
    fn no_placeholder_without_a_defer() {
        let progress = Mutex::new(None);
        assert_eq!(claim_placeholder(&progress), None);
    }
}
