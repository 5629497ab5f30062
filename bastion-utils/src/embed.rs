use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x00_99_FF;
pub const LOCKED_COLOR: u32 = 0xFF_00_00;
pub const UNLOCKED_COLOR: u32 = 0x00_FF_00;
pub const HIDDEN_COLOR: u32 = 0xFF_6B_6B;
pub const NOTICE_COLOR: u32 = 0xFF_A5_00;
pub const BULK_COLOR: u32 = 0x00_D4_FF;
pub const NEUTRAL_COLOR: u32 = 0x80_80_80;

pub const ROLE_FOOTER: &str = "Role Management System";

/// One embed field: name, value, inline.
pub type Field = (String, String, bool);

pub fn field(name: &str, value: impl Into<String>, inline: bool) -> Field {
    (name.to_owned(), value.into(), inline)
}

/// Timestamped confirmation embed used by every mutating command.
pub fn action_embed(
    color: u32,
    title: &str,
    description: Option<&str>,
    fields: Vec<Field>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .color(color)
        .title(title.to_owned())
        .fields(fields)
        .timestamp(serenity::Timestamp::now());

    if let Some(description) = description {
        embed = embed.description(description.to_owned());
    }

    embed
}
