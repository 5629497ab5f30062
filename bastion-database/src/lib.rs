pub mod cache;
pub mod database;
pub mod impls;
pub mod model;
pub mod store;

pub use cache::CacheService;
pub use database::{Database, MIGRATOR};
pub use model::guild_config::GuildConfig;
pub use store::{GuildConfigField, GuildConfigStore};
