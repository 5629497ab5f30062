mod memory;

use tracing::debug;

use crate::database::Database;
use crate::impls::guild_config::{get_guild_config, set_guild_config_field};
use crate::model::guild_config::GuildConfig;

pub use memory::MemoryConfigStore;

/// Columns of [`GuildConfig`] that admin commands may set or clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuildConfigField {
    AdminChannel,
    JoinToCreateChannel,
    LogChannel,
}

impl GuildConfigField {
    pub fn apply(self, config: &mut GuildConfig, channel_id: Option<u64>) {
        match self {
            Self::AdminChannel => config.admin_channel_id = channel_id,
            Self::JoinToCreateChannel => config.join_to_create_channel_id = channel_id,
            Self::LogChannel => config.log_channel_id = channel_id,
        }
    }

    pub fn read(self, config: &GuildConfig) -> Option<u64> {
        match self {
            Self::AdminChannel => config.admin_channel_id,
            Self::JoinToCreateChannel => config.join_to_create_channel_id,
            Self::LogChannel => config.log_channel_id,
        }
    }
}

#[derive(Clone, Debug)]
enum StoreBackend {
    Memory(MemoryConfigStore),
    Postgres(Database),
}

/// Per-guild configuration handle injected into handlers and the
/// authorization gate.
#[derive(Clone, Debug)]
pub struct GuildConfigStore {
    backend: StoreBackend,
}

impl GuildConfigStore {
    /// Process-local store; everything is lost on restart.
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::Memory(MemoryConfigStore::default()),
        }
    }

    pub fn postgres(db: Database) -> Self {
        Self {
            backend: StoreBackend::Postgres(db),
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self.backend, StoreBackend::Postgres(_))
    }

    pub async fn get(&self, guild_id: u64) -> anyhow::Result<Option<GuildConfig>> {
        match &self.backend {
            StoreBackend::Memory(store) => Ok(store.get(guild_id).await),
            StoreBackend::Postgres(db) => get_guild_config(db, guild_id).await,
        }
    }

    pub async fn channel(
        &self,
        guild_id: u64,
        field: GuildConfigField,
    ) -> anyhow::Result<Option<u64>> {
        Ok(self
            .get(guild_id)
            .await?
            .and_then(|config| field.read(&config)))
    }

    pub async fn set(
        &self,
        guild_id: u64,
        field: GuildConfigField,
        channel_id: u64,
    ) -> anyhow::Result<()> {
        self.write(guild_id, field, Some(channel_id)).await
    }

    pub async fn clear(&self, guild_id: u64, field: GuildConfigField) -> anyhow::Result<()> {
        self.write(guild_id, field, None).await
    }

    async fn write(
        &self,
        guild_id: u64,
        field: GuildConfigField,
        channel_id: Option<u64>,
    ) -> anyhow::Result<()> {
        debug!(guild_id, ?field, ?channel_id, "writing guild config");

        match &self.backend {
            StoreBackend::Memory(store) => {
                store.write(guild_id, field, channel_id).await;
                Ok(())
            }
            StoreBackend::Postgres(db) => {
                set_guild_config_field(db, guild_id, field, channel_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::{GuildConfigField, GuildConfigStore};
    use crate::cache::CacheService;
    use crate::database::Database;

    #[tokio::test]
    async fn absent_guild_has_no_config() {
        let store = GuildConfigStore::in_memory();
        assert_eq!(store.get(1).await.expect("memory read"), None);
        assert!(!store.is_durable());
    }

    #[tokio::test]
    async fn only_postgres_backend_is_durable() {
        let pool = PgPool::connect_lazy("postgres://localhost/bastion").expect("lazy pool");
        let db = Database::with_cache(pool, CacheService::disabled("bastion:test"));
        assert!(GuildConfigStore::postgres(db).is_durable());
    }

    #[tokio::test]
    async fn first_write_creates_entry_and_clear_keeps_it() {
        let store = GuildConfigStore::in_memory();
        store
            .set(7, GuildConfigField::JoinToCreateChannel, 99)
            .await
            .expect("set");
        assert_eq!(
            store
                .channel(7, GuildConfigField::JoinToCreateChannel)
                .await
                .expect("read"),
            Some(99)
        );

        store
            .clear(7, GuildConfigField::JoinToCreateChannel)
            .await
            .expect("clear");

        let config = store.get(7).await.expect("read").expect("entry persists");
        assert_eq!(config.join_to_create_channel_id, None);
    }

    #[tokio::test]
    async fn fields_are_independent() {
        let store = GuildConfigStore::in_memory();
        store
            .set(3, GuildConfigField::AdminChannel, 10)
            .await
            .expect("set admin");
        store
            .set(3, GuildConfigField::LogChannel, 11)
            .await
            .expect("set log");
        store
            .clear(3, GuildConfigField::LogChannel)
            .await
            .expect("clear log");

        let config = store.get(3).await.expect("read").expect("entry");
        assert_eq!(config.admin_channel_id, Some(10));
        assert_eq!(config.log_channel_id, None);
    }
}
