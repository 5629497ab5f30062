pub mod guild_config;
