use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Milliseconds between the unix epoch and the first Discord snowflake.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}

/// Creation time encoded in the top 42 bits of a snowflake id.
pub fn snowflake_unix_millis(id: u64) -> u64 {
    (id >> 22) + DISCORD_EPOCH_MS
}

/// Milliseconds from a snowflake's creation to `now_ms`, clamped at zero for
/// clock skew.
pub fn millis_since_snowflake(id: u64, now_ms: u64) -> u64 {
    now_ms.saturating_sub(snowflake_unix_millis(id))
}

/// Discord timestamp markup, e.g. `<t:1700000000:F>`.
pub fn discord_timestamp(unix_secs: i64, style: char) -> String {
    format!("<t:{unix_secs}:{style}>")
}

#[cfg(test)]
mod tests {
    use super::{DISCORD_EPOCH_MS, millis_since_snowflake, snowflake_unix_millis};

    #[test]
    fn snowflakes_decode_to_unix_millis() {
        assert_eq!(snowflake_unix_millis(0), DISCORD_EPOCH_MS);
        // 175928847299117063 was created at 2016-04-30 11:18:25.796 UTC.
        assert_eq!(snowflake_unix_millis(175_928_847_299_117_063), 1_462_015_105_796);
    }

    #[test]
    fn latency_is_measured_from_creation() {
        let id = 175_928_847_299_117_063;
        assert_eq!(millis_since_snowflake(id, 1_462_015_106_046), 250);
        assert_eq!(millis_since_snowflake(id, 1_462_015_105_000), 0);
    }
}
