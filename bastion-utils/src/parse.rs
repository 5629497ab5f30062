/// Parse a channel mention (`<#id>`) or a raw id.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    parse_mention(raw, &["<#"])
}

/// Parse a role mention (`<@&id>`) or a raw id.
pub fn parse_role_id(raw: &str) -> Option<u64> {
    parse_mention(raw, &["<@&"])
}

/// Parse a user mention (`<@id>` or `<@!id>`) or a raw id.
pub fn parse_user_id(raw: &str) -> Option<u64> {
    parse_mention(raw, &["<@!", "<@"])
}

fn parse_mention(raw: &str, prefixes: &[&str]) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<u64>() {
        return (id > 0).then_some(id);
    }

    let inner = raw.strip_suffix('>')?;
    let digits = prefixes
        .iter()
        .find_map(|prefix| inner.strip_prefix(prefix))?;
    digits.parse::<u64>().ok().filter(|id| *id > 0)
}

/// Parse an integer and accept it only inside `min..=max`.
pub fn parse_in_range(raw: Option<&str>, min: i64, max: i64) -> Option<i64> {
    raw?.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| (min..=max).contains(value))
}

/// Parse `#RRGGBB` or `RRGGBB` into an RGB integer.
pub fn parse_hex_color(raw: &str) -> Option<u32> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_channel_id, parse_hex_color, parse_in_range, parse_role_id, parse_user_id};

    #[test]
    fn parses_channel_mentions_and_ids() {
        assert_eq!(parse_channel_id("<#123>"), Some(123));
        assert_eq!(parse_channel_id("123"), Some(123));
        assert_eq!(parse_channel_id("<@123>"), None);
        assert_eq!(parse_channel_id("general"), None);
        assert_eq!(parse_channel_id("0"), None);
    }

    #[test]
    fn parses_role_mentions() {
        assert_eq!(parse_role_id("<@&55>"), Some(55));
        assert_eq!(parse_role_id("55"), Some(55));
        assert_eq!(parse_role_id("<@55>"), None);
    }

    #[test]
    fn parses_user_mentions() {
        assert_eq!(parse_user_id("<@7>"), Some(7));
        assert_eq!(parse_user_id("<@!7>"), Some(7));
        assert_eq!(parse_user_id("<@&7>"), None);
    }

    #[test]
    fn bounded_integers() {
        assert_eq!(parse_in_range(Some("0"), 0, 21600), Some(0));
        assert_eq!(parse_in_range(Some("21600"), 0, 21600), Some(21600));
        assert_eq!(parse_in_range(Some("21601"), 0, 21600), None);
        assert_eq!(parse_in_range(Some("-1"), 0, 21600), None);
        assert_eq!(parse_in_range(Some("ten"), 0, 21600), None);
        assert_eq!(parse_in_range(None, 0, 21600), None);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#FF0000"), Some(0xFF0000));
        assert_eq!(parse_hex_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }
}
