mod events;

use std::env;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use bastion_core::settings::env_bool;
use bastion_core::{Data, Error, Settings};
use bastion_database::{CacheService, Database, GuildConfigStore, MIGRATOR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;
    let guild_id = match env::var("DISCORD_GUILD_ID") {
        Ok(raw) => Some(serenity::GuildId::new(raw.trim().parse::<u64>()?)),
        Err(_) => None,
    };
    let settings = Settings::from_env();
    info!(
        bot_owner_id = %settings.bot_owner_id,
        owner_channel_id = %settings.owner_channel_id,
        "Settings loaded."
    );

    let configs = connect_config_store().await?;
    if !configs.is_durable() {
        warn!("DATABASE_URL is not set; guild configuration will not survive restarts.");
    }
    let data = Data::new(settings, configs);

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                info!("Bastion is online.");

                let commands = bastion_commands::registration::slash_commands();
                let count = commands.len();
                match guild_id {
                    Some(guild_id) => {
                        guild_id.set_commands(&ctx.http, commands).await?;
                        info!(guild_id = %guild_id, count, "Slash commands registered in guild.");
                    }
                    None => {
                        serenity::Command::set_global_commands(&ctx.http, commands).await?;
                        info!(count, "Slash commands registered globally.");
                    }
                }

                Ok(data)
            })
        })
        .build();

    info!("Bastion is connecting...");

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

/// Postgres-backed config when `DATABASE_URL` is set, process-local otherwise.
async fn connect_config_store() -> anyhow::Result<GuildConfigStore> {
    let Ok(database_url) = env::var("DATABASE_URL") else {
        return Ok(GuildConfigStore::in_memory());
    };

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    info!("PostgreSQL connection established.");

    let cache = connect_cache().await;
    let db = Database::with_cache(db_pool, cache);

    if env_bool("AUTO_RUN_MIGRATIONS", true) {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    Ok(GuildConfigStore::postgres(db))
}

async fn connect_cache() -> CacheService {
    let redis_key_prefix =
        env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "bastion:prod".to_string());

    if !env_bool("REDIS_ENABLED", false) {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        return CacheService::disabled(redis_key_prefix);
    }

    let cache = match env::var("REDIS_URL") {
        Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
            Ok(cache) => {
                info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                cache
            }
            Err(err) => {
                warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                return CacheService::disabled(redis_key_prefix);
            }
        },
        Err(_) => {
            warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
            return CacheService::disabled(redis_key_prefix);
        }
    };

    if let Err(err) = cache.ping().await {
        warn!(
            ?err,
            "Redis cache ping failed; cache operations will continue with fallback behavior."
        );
    } else {
        info!("Redis cache health check passed.");
    }

    cache
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(?error, event = event.snake_case_name(), "event handler error");
        }
        poise::FrameworkError::Setup { error, .. } => {
            error!(?error, "framework setup failed");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            bastion_commands::handle_message(ctx, data, new_message).await?;
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Command(command),
        } => {
            bastion_commands::handle_interaction(ctx, data, command).await?;
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            events::join_to_create::handle_voice_state_update(ctx, data, old.as_ref(), new).await;
        }
        _ => {}
    }

    Ok(())
}
