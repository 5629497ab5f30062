//! Alias routing, authorization gating and failure reporting for commands.
//!
//! A [`CommandDispatcher`] owns a static alias table and the handlers bound to
//! each canonical command. Handlers only see a [`Session`]; the dispatcher
//! guarantees that a denied or failed invocation produces exactly one reply
//! and that nothing escapes past it.

use std::collections::HashMap;

use poise::BoxFuture;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use bastion_database::GuildConfig;

use crate::Error;
use crate::auth::{AccessRule, ActorContext, AuthorizationPolicy};

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    String(String),
    Boolean(bool),
    User(serenity::UserId),
    Role(serenity::RoleId),
    Channel(serenity::ChannelId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Arguments {
    /// Whitespace separated tokens after the command name.
    Text(Vec<String>),
    /// Options already parsed by Discord, keyed by option name.
    Structured(HashMap<String, OptionValue>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvocationStyle {
    Text,
    Structured,
}

#[derive(Clone, Debug)]
pub struct CommandInvocation {
    /// The command token as the user typed it.
    pub name: String,
    pub arguments: Arguments,
    pub actor: ActorContext,
}

impl CommandInvocation {
    pub fn text(name: impl Into<String>, tokens: Vec<String>, actor: ActorContext) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::Text(tokens),
            actor,
        }
    }

    pub fn structured(
        name: impl Into<String>,
        options: HashMap<String, OptionValue>,
        actor: ActorContext,
    ) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::Structured(options),
            actor,
        }
    }

    pub fn style(&self) -> InvocationStyle {
        match self.arguments {
            Arguments::Text(_) => InvocationStyle::Text,
            Arguments::Structured(_) => InvocationStyle::Structured,
        }
    }

    /// Text tokens; empty for slash commands.
    pub fn tokens(&self) -> &[String] {
        match &self.arguments {
            Arguments::Text(tokens) => tokens,
            Arguments::Structured(_) => &[],
        }
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens().get(index).map(String::as_str)
    }

    /// Join the tokens from `start` onwards with `separator`.
    pub fn rest(&self, start: usize, separator: &str) -> String {
        self.tokens()
            .get(start..)
            .map(|tokens| tokens.join(separator))
            .unwrap_or_default()
    }

    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        match &self.arguments {
            Arguments::Text(_) => None,
            Arguments::Structured(options) => options.get(name),
        }
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        match self.option(name) {
            Some(OptionValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn boolean_option(&self, name: &str) -> Option<bool> {
        match self.option(name) {
            Some(OptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn user_option(&self, name: &str) -> Option<serenity::UserId> {
        match self.option(name) {
            Some(OptionValue::User(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn role_option(&self, name: &str) -> Option<serenity::RoleId> {
        match self.option(name) {
            Some(OptionValue::Role(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn channel_option(&self, name: &str) -> Option<serenity::ChannelId> {
        match self.option(name) {
            Some(OptionValue::Channel(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Whether the platform has already answered this invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseState {
    Pending,
    Deferred,
    Replied,
}

/// A short plain-text response owned by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub content: String,
    pub ephemeral: bool,
}

/// Platform side of one invocation.
pub trait Session: Send + Sync {
    fn invocation(&self) -> &CommandInvocation;

    fn guild_config(&self) -> BoxFuture<'_, Result<Option<GuildConfig>, Error>>;

    fn response_state(&self) -> ResponseState;

    /// Initial response to the invocation.
    fn reply(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>>;

    /// Additional response once something has already been sent or deferred.
    fn follow_up(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>>;
}

pub type Handler<S> =
    Box<dyn for<'s> Fn(&'s S) -> BoxFuture<'s, Result<(), Error>> + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The token is not one of this dispatcher's commands.
    NotHandled,
    Denied,
    Succeeded,
    Failed,
}

impl DispatchOutcome {
    pub fn handled(self) -> bool {
        !matches!(self, Self::NotHandled)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchMessages {
    pub unauthorized: &'static str,
    pub failure_prefix: &'static str,
    pub ephemeral: bool,
}

impl DispatchMessages {
    pub const TEXT: Self = Self {
        unauthorized: "❌ You are not authorized to use this command.",
        failure_prefix: "❌ Error: ",
        ephemeral: false,
    };

    pub const STRUCTURED: Self = Self {
        unauthorized: "❌ Unauthorized",
        failure_prefix: "❌ Error: ",
        ephemeral: true,
    };

    pub fn for_style(style: InvocationStyle) -> Self {
        match style {
            InvocationStyle::Text => Self::TEXT,
            InvocationStyle::Structured => Self::STRUCTURED,
        }
    }

    pub fn failure(&self, error: &Error) -> String {
        format!("{}{}", self.failure_prefix, error)
    }
}

pub struct CommandDispatcher<S> {
    name: &'static str,
    rule: AccessRule,
    messages: DispatchMessages,
    aliases: HashMap<String, &'static str>,
    handlers: HashMap<&'static str, Handler<S>>,
}

impl<S: Session> CommandDispatcher<S> {
    pub fn new(name: &'static str, style: InvocationStyle, rule: AccessRule) -> Self {
        Self {
            name,
            rule,
            messages: DispatchMessages::for_style(style),
            aliases: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Map every alias to `canonical`. A repeated alias points at the latest canonical.
    pub fn register_alias(&mut self, aliases: &[&str], canonical: &'static str) {
        for alias in aliases {
            self.aliases.insert(alias.to_ascii_lowercase(), canonical);
        }
    }

    /// Bind `handler` to `canonical` and route the canonical name plus `aliases` to it.
    pub fn command<F>(mut self, canonical: &'static str, aliases: &[&str], handler: F) -> Self
    where
        F: for<'s> Fn(&'s S) -> BoxFuture<'s, Result<(), Error>> + Send + Sync + 'static,
    {
        self.register_alias(&[canonical], canonical);
        self.register_alias(aliases, canonical);
        self.handlers.insert(canonical, Box::new(handler));
        self
    }

    pub fn resolve(&self, raw: &str) -> Option<&'static str> {
        self.aliases.get(&raw.to_ascii_lowercase()).copied()
    }

    /// Canonical names with a bound handler, sorted.
    pub fn canonical_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Aliases other than the canonical name itself, sorted.
    pub fn aliases_of(&self, canonical: &str) -> Vec<&str> {
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(alias, target)| **target == canonical && alias.as_str() != canonical)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    pub async fn dispatch(
        &self,
        raw: &str,
        session: &S,
        policy: &AuthorizationPolicy,
    ) -> DispatchOutcome {
        let Some(canonical) = self.resolve(raw) else {
            return DispatchOutcome::NotHandled;
        };

        let Some(handler) = self.handlers.get(canonical) else {
            warn!(
                dispatcher = self.name,
                command = canonical,
                "alias resolves to a command without a handler"
            );
            return DispatchOutcome::NotHandled;
        };

        let actor = session.invocation().actor;
        let config = if self.rule.needs_guild_config() {
            match session.guild_config().await {
                Ok(config) => config,
                Err(source) => {
                    warn!(?source, guild_id = actor.guild_id.get(), "failed to load guild config; using defaults");
                    None
                }
            }
        } else {
            None
        };

        if !policy.permits(self.rule, &actor, config.as_ref()) {
            debug!(
                dispatcher = self.name,
                command = canonical,
                user_id = actor.user_id.get(),
                channel_id = actor.channel_id.get(),
                "command denied"
            );
            self.deliver(session, self.messages.unauthorized.to_owned())
                .await;
            return DispatchOutcome::Denied;
        }

        match handler(session).await {
            Ok(()) => DispatchOutcome::Succeeded,
            Err(source) => {
                error!(
                    ?source,
                    dispatcher = self.name,
                    command = canonical,
                    guild_id = actor.guild_id.get(),
                    "command handler failed"
                );
                self.deliver(session, self.messages.failure(&source)).await;
                DispatchOutcome::Failed
            }
        }
    }

    async fn deliver(&self, session: &S, content: String) {
        let notice = Notice {
            content,
            ephemeral: self.messages.ephemeral,
        };

        let result = match session.response_state() {
            ResponseState::Pending => session.reply(notice).await,
            ResponseState::Deferred | ResponseState::Replied => session.follow_up(notice).await,
        };

        if let Err(source) = result {
            error!(?source, dispatcher = self.name, "failed to deliver dispatcher response");
        }
    }
}

/// Ordered set of dispatchers; the first one that handles a token wins.
pub struct Router<S> {
    dispatchers: Vec<CommandDispatcher<S>>,
}

impl<S: Session> Router<S> {
    pub fn new(dispatchers: Vec<CommandDispatcher<S>>) -> Self {
        Self { dispatchers }
    }

    pub fn dispatchers(&self) -> &[CommandDispatcher<S>] {
        &self.dispatchers
    }

    pub fn recognizes(&self, raw: &str) -> bool {
        self.dispatchers
            .iter()
            .any(|dispatcher| dispatcher.resolve(raw).is_some())
    }

    pub async fn dispatch(
        &self,
        raw: &str,
        session: &S,
        policy: &AuthorizationPolicy,
    ) -> DispatchOutcome {
        for dispatcher in &self.dispatchers {
            let outcome = dispatcher.dispatch(raw, session, policy).await;
            if outcome.handled() {
                return outcome;
            }
        }

        DispatchOutcome::NotHandled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use poise::BoxFuture;
    use poise::serenity_prelude as serenity;

    use bastion_database::GuildConfig;

    use super::{
        CommandDispatcher, CommandInvocation, DispatchMessages, DispatchOutcome, InvocationStyle,
        Notice, ResponseState, Router, Session,
    };
    use crate::Error;
    use crate::auth::{AccessRule, ActorContext, AuthorizationPolicy};

    const FALLBACK: u64 = 100;

    #[derive(Debug, PartialEq, Eq)]
    enum Delivery {
        Reply,
        FollowUp,
    }

    struct FakeSession {
        invocation: CommandInvocation,
        state: Mutex<ResponseState>,
        sent: Mutex<Vec<(Delivery, Notice)>>,
        handler_runs: AtomicUsize,
        config_loads: AtomicUsize,
    }

    impl FakeSession {
        fn new(name: &str, actor: ActorContext) -> Self {
            Self {
                invocation: CommandInvocation::text(name, vec!["arg".to_owned()], actor),
                state: Mutex::new(ResponseState::Pending),
                sent: Mutex::new(Vec::new()),
                handler_runs: AtomicUsize::new(0),
                config_loads: AtomicUsize::new(0),
            }
        }

        fn runs(&self) -> usize {
            self.handler_runs.load(Ordering::SeqCst)
        }

        fn sent(&self) -> Vec<(Delivery, Notice)> {
            std::mem::take(&mut *self.sent.lock().expect("sent lock"))
        }
    }

    impl Session for FakeSession {
        fn invocation(&self) -> &CommandInvocation {
            &self.invocation
        }

        fn guild_config(&self) -> BoxFuture<'_, Result<Option<GuildConfig>, Error>> {
            Box::pin(async move {
                self.config_loads.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
        }

        fn response_state(&self) -> ResponseState {
            *self.state.lock().expect("state lock")
        }

        fn reply(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>> {
            Box::pin(async move {
                *self.state.lock().expect("state lock") = ResponseState::Replied;
                self.sent
                    .lock()
                    .expect("sent lock")
                    .push((Delivery::Reply, notice));
                Ok(())
            })
        }

        fn follow_up(&self, notice: Notice) -> BoxFuture<'_, Result<(), Error>> {
            Box::pin(async move {
                self.sent
                    .lock()
                    .expect("sent lock")
                    .push((Delivery::FollowUp, notice));
                Ok(())
            })
        }
    }

    fn succeed(session: &FakeSession) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            session.handler_runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn fail(session: &FakeSession) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            session.handler_runs.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("Missing Permissions"))
        })
    }

    fn defer_then_fail(session: &FakeSession) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            session.handler_runs.fetch_add(1, Ordering::SeqCst);
            *session.state.lock().expect("state lock") = ResponseState::Deferred;
            Err(anyhow::anyhow!("Unknown Channel"))
        })
    }

    fn policy() -> AuthorizationPolicy {
        AuthorizationPolicy::new(serenity::ChannelId::new(FALLBACK))
    }

    fn owner() -> ActorContext {
        ActorContext {
            user_id: serenity::UserId::new(1),
            guild_id: serenity::GuildId::new(9),
            channel_id: serenity::ChannelId::new(555),
            is_bot_owner: true,
            is_guild_owner: false,
            has_elevated_permission: false,
        }
    }

    fn member() -> ActorContext {
        ActorContext {
            is_bot_owner: false,
            ..owner()
        }
    }

    fn channels() -> CommandDispatcher<FakeSession> {
        CommandDispatcher::new("channels", InvocationStyle::Text, AccessRule::Text)
            .command("lock", &["locktext"], succeed)
            .command("nuke", &[], fail)
            .command("lockall", &[], defer_then_fail)
    }

    #[tokio::test]
    async fn unknown_token_is_not_handled_and_silent() {
        let session = FakeSession::new("dance", owner());
        let outcome = channels().dispatch("dance", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::NotHandled);
        assert!(!outcome.handled());
        assert!(session.sent().is_empty());
        assert_eq!(session.config_loads.load(Ordering::SeqCst), 0);
        assert_eq!(session.runs(), 0);
    }

    #[tokio::test]
    async fn denied_actor_gets_one_reply_and_no_handler_run() {
        let session = FakeSession::new("lock", member());
        let outcome = channels().dispatch("lock", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert!(outcome.handled());
        assert_eq!(session.runs(), 0);

        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Delivery::Reply);
        assert_eq!(
            sent[0].1.content,
            "❌ You are not authorized to use this command."
        );
    }

    #[tokio::test]
    async fn handler_failure_becomes_one_error_reply() {
        let session = FakeSession::new("nuke", owner());
        let outcome = channels().dispatch("nuke", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert!(outcome.handled());
        assert_eq!(session.runs(), 1);

        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Delivery::Reply);
        assert!(sent[0].1.content.contains("Missing Permissions"));
        assert!(sent[0].1.content.starts_with("❌ Error: "));
    }

    #[tokio::test]
    async fn failure_after_defer_is_a_follow_up() {
        let session = FakeSession::new("lockall", owner());
        let outcome = channels().dispatch("lockall", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Delivery::FollowUp);
        assert!(sent[0].1.content.contains("Unknown Channel"));
    }

    #[test]
    fn failure_text_is_shared_by_both_styles() {
        let error = anyhow::anyhow!("HTTP 429 Too Many Requests");
        for style in [InvocationStyle::Text, InvocationStyle::Structured] {
            assert_eq!(
                DispatchMessages::for_style(style).failure(&error),
                "❌ Error: HTTP 429 Too Many Requests"
            );
        }
    }

    #[tokio::test]
    async fn success_emits_nothing_from_the_dispatcher() {
        let session = FakeSession::new("lock", owner());
        let outcome = channels().dispatch("lock", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::Succeeded);
        assert_eq!(session.runs(), 1);
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn aliases_resolve_to_the_same_command() {
        let dispatcher = channels();
        assert_eq!(dispatcher.resolve("lock"), Some("lock"));
        assert_eq!(dispatcher.resolve("locktext"), Some("lock"));
        assert_eq!(dispatcher.resolve("LOCKTEXT"), Some("lock"));

        for token in ["lock", "locktext"] {
            let session = FakeSession::new(token, owner());
            let outcome = dispatcher.dispatch(token, &session, &policy()).await;
            assert_eq!(outcome, DispatchOutcome::Succeeded);
            assert_eq!(session.runs(), 1);
        }
    }

    #[test]
    fn duplicate_alias_takes_the_last_registration() {
        let mut dispatcher = channels();
        dispatcher.register_alias(&["zap"], "lock");
        dispatcher.register_alias(&["zap"], "nuke");
        assert_eq!(dispatcher.resolve("zap"), Some("nuke"));
        assert_eq!(dispatcher.aliases_of("lock"), vec!["locktext"]);
        assert_eq!(dispatcher.canonical_names(), vec!["lock", "lockall", "nuke"]);
    }

    #[tokio::test]
    async fn alias_without_handler_is_not_handled() {
        let mut dispatcher = channels();
        dispatcher.register_alias(&["ghost"], "ghost");

        let session = FakeSession::new("ghost", owner());
        let outcome = dispatcher.dispatch("ghost", &session, &policy()).await;
        assert_eq!(outcome, DispatchOutcome::NotHandled);
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn structured_dispatcher_replies_ephemerally() {
        let dispatcher: CommandDispatcher<FakeSession> = CommandDispatcher::new(
            "roles",
            InvocationStyle::Structured,
            AccessRule::Structured,
        )
        .command("roles", &[], succeed);

        let session = FakeSession::new("roles", member());
        let outcome = dispatcher.dispatch("roles", &session, &policy()).await;

        assert_eq!(outcome, DispatchOutcome::Denied);
        assert_eq!(session.config_loads.load(Ordering::SeqCst), 0);
        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.content, "❌ Unauthorized");
        assert!(sent[0].1.ephemeral);
    }

    #[tokio::test]
    async fn router_falls_through_to_the_next_dispatcher() {
        let utility: CommandDispatcher<FakeSession> =
            CommandDispatcher::new("utility", InvocationStyle::Text, AccessRule::Public)
                .command("ping", &[], succeed);
        let router = Router::new(vec![channels(), utility]);

        assert!(router.recognizes("ping"));
        assert!(router.recognizes("locktext"));
        assert!(!router.recognizes("dance"));

        let session = FakeSession::new("ping", member());
        let outcome = router.dispatch("ping", &session, &policy()).await;
        assert_eq!(outcome, DispatchOutcome::Succeeded);
        assert_eq!(session.runs(), 1);

        let session = FakeSession::new("dance", member());
        let outcome = router.dispatch("dance", &session, &policy()).await;
        assert_eq!(outcome, DispatchOutcome::NotHandled);
        assert!(session.sent().is_empty());
    }

    #[test]
    fn invocation_helpers() {
        let invocation = CommandInvocation::text(
            "rename",
            vec!["General".to_owned(), "Chat".to_owned()],
            owner(),
        );
        assert_eq!(invocation.token(0), Some("General"));
        assert_eq!(invocation.rest(0, "-"), "General-Chat");
        assert_eq!(invocation.rest(5, " "), "");
        assert_eq!(invocation.string_option("name"), None);
        assert_eq!(invocation.style(), InvocationStyle::Text);
    }
}
