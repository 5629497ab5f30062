use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::GuildConfigField;
use crate::model::guild_config::GuildConfig;

#[derive(Clone, Debug, Default)]
pub struct MemoryConfigStore {
    configs: Arc<RwLock<HashMap<u64, GuildConfig>>>,
}

impl MemoryConfigStore {
    pub async fn get(&self, guild_id: u64) -> Option<GuildConfig> {
        self.configs.read().await.get(&guild_id).cloned()
    }

    pub async fn write(&self, guild_id: u64, field: GuildConfigField, channel_id: Option<u64>) {
        let mut configs = self.configs.write().await;
        let config = configs
            .entry(guild_id)
            .or_insert_with(|| GuildConfig::new(guild_id));
        field.apply(config, channel_id);
    }
}
