use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, guild_config_key, invalidate_guild_config};
use crate::database::Database;
use crate::model::guild_config::GuildConfig;
use crate::store::GuildConfigField;

pub async fn get_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<Option<GuildConfig>> {
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

            let row = sqlx::query_as::<_, (Option<i64>, Option<i64>, Option<i64>)>(
                "SELECT admin_channel_id, join_to_create_channel_id, log_channel_id
                 FROM guild_config WHERE guild_id = $1",
            )
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?;

            let Some((admin, join_to_create, log)) = row else {
                return Ok(None);
            };

            Ok(Some(GuildConfig {
                guild_id,
                admin_channel_id: to_channel_id(admin)?,
                join_to_create_channel_id: to_channel_id(join_to_create)?,
                log_channel_id: to_channel_id(log)?,
            }))
        })
        .await
}

/// Upsert one column of the guild's row. `None` clears the column but keeps the row.
pub async fn set_guild_config_field(
    db: &Database,
    guild_id: u64,
    field: GuildConfigField,
    channel_id: Option<u64>,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = channel_id
        .map(i64::try_from)
        .transpose()
        .context("channel_id out of i64 range")?;

    sqlx::query(upsert_statement(field))
        .bind(guild_id_i64)
        .bind(channel_id_i64)
        .execute(db.pool())
        .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

fn upsert_statement(field: GuildConfigField) -> &'static str {
    match field {
        GuildConfigField::AdminChannel => {
            "INSERT INTO guild_config (guild_id, admin_channel_id)
             VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE
             SET admin_channel_id = EXCLUDED.admin_channel_id, updated_at = NOW()"
        }
        GuildConfigField::JoinToCreateChannel => {
            "INSERT INTO guild_config (guild_id, join_to_create_channel_id)
             VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE
             SET join_to_create_channel_id = EXCLUDED.join_to_create_channel_id, updated_at = NOW()"
        }
        GuildConfigField::LogChannel => {
            "INSERT INTO guild_config (guild_id, log_channel_id)
             VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE
             SET log_channel_id = EXCLUDED.log_channel_id, updated_at = NOW()"
        }
    }
}

fn to_channel_id(raw: Option<i64>) -> anyhow::Result<Option<u64>> {
    raw.map(u64::try_from)
        .transpose()
        .context("channel id out of u64 range")
}
