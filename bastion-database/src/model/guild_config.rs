use serde::{Deserialize, Serialize};

/// Per-guild overrides. A guild without a row uses the fallback owner
/// channel only and has no join-to-create or audit log channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub admin_channel_id: Option<u64>,
    pub join_to_create_channel_id: Option<u64>,
    pub log_channel_id: Option<u64>,
}

impl GuildConfig {
    pub fn new(guild_id: u64) -> Self {
        Self {
            guild_id,
            ..Default::default()
        }
    }
}
