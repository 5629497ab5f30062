pub mod auth;
pub mod dispatch;
pub mod settings;
pub mod tally;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use bastion_database::GuildConfigStore;

pub use auth::{AccessRule, ActorContext, AuthorizationPolicy};
pub use settings::Settings;

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    pub settings: Arc<Settings>,
    pub configs: GuildConfigStore,
    /// Voice channels spawned by join-to-create, deleted once empty.
    pub temp_voice_channels: Arc<RwLock<HashSet<u64>>>,
    pub started_at: Instant,
}

impl Data {
    pub fn new(settings: Settings, configs: GuildConfigStore) -> Self {
        Self {
            settings: Arc::new(settings),
            configs,
            temp_voice_channels: Default::default(),
            started_at: Instant::now(),
        }
    }

    pub fn policy(&self) -> AuthorizationPolicy {
        self.settings.policy()
    }
}
