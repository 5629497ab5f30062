use std::time::Instant;

use bastion_core::Error;
use bastion_utils::embed::{UNLOCKED_COLOR, action_embed, field};
use bastion_utils::formatting::latency_status;
use bastion_utils::time::{millis_since_snowflake, now_unix_millis};

use crate::session::CommandSession;

pub async fn ping(session: &CommandSession) -> Result<(), Error> {
    let bot_latency = millis_since_snowflake(session.source_id(), now_unix_millis());

    let started = Instant::now();
    session.http().get_current_user().await?;
    let api_latency = started.elapsed().as_millis();

    let embed = action_embed(
        UNLOCKED_COLOR,
        "🏓 Pong!",
        Some("**Bot Performance Metrics**"),
        vec![
            field("🤖 Bot Latency", format!("{}ms", bot_latency), true),
            field("📡 API Latency", format!("{}ms", api_latency), true),
            field("⚡ Status", latency_status(u128::from(bot_latency)), true),
        ],
    );

    session.send_embed(embed).await
}
