/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    if hours > 0 {
        let mut parts = vec![format!("{}h", hours)];
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if seconds > 0 {
            parts.push(format!("{}s", seconds));
        }
        return parts.join(" ");
    }

    if minutes > 0 {
        return if seconds > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}m", minutes)
        };
    }

    format!("{}s", seconds)
}

/// Full uptime breakdown, always showing every unit (e.g. `0d 1h 2m 3s`).
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

pub fn user_limit_label(limit: u32) -> String {
    if limit == 0 {
        "Unlimited".to_owned()
    } else {
        format!("{limit} users")
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

pub fn latency_status(latency_ms: u128) -> &'static str {
    match latency_ms {
        0..200 => "✅ Excellent",
        200..500 => "🟡 Good",
        _ => "🔴 Poor",
    }
}

/// Channel names are dash-joined and lowercase.
pub fn normalize_channel_name(words: &[String]) -> String {
    words.join("-").to_lowercase()
}

/// Break user-supplied `@` mentions so echoed text cannot ping anyone.
pub fn escape_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

/// Render up to `max` lines numbered from 1, with a trailing "... and N more" line.
pub fn numbered_list(lines: &[String], max: usize, noun: &str) -> String {
    let mut out = lines
        .iter()
        .take(max)
        .enumerate()
        .map(|(index, line)| format!("{}. {}", index + 1, line))
        .collect::<Vec<_>>()
        .join("\n");

    if lines.len() > max {
        out.push_str(&format!("\n... and {} more {}", lines.len() - max, noun));
    }

    out
}

/// Comma-join the first `max` items, appending "... and N more" when truncated.
pub fn capped_join(items: &[String], max: usize, empty: &str) -> String {
    if items.is_empty() {
        return empty.to_owned();
    }

    let shown = items
        .iter()
        .take(max)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    if items.len() > max {
        format!("{}\n... and {} more", shown, items.len() - max)
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::{
        capped_join, escape_mentions, format_compact_duration, format_uptime, latency_status,
        normalize_channel_name, numbered_list, user_limit_label, yes_no,
    };

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3670), "1h 1m 10s");
        assert_eq!(format_compact_duration(90000), "1d 1h");
    }

    #[test]
    fn uptime_shows_all_units() {
        assert_eq!(format_uptime(0), "0d 0h 0m 0s");
        assert_eq!(format_uptime(93_784), "1d 2h 3m 4s");
    }

    #[test]
    fn user_limit_zero_is_unlimited() {
        assert_eq!(user_limit_label(0), "Unlimited");
        assert_eq!(user_limit_label(12), "12 users");
    }

    #[test]
    fn latency_buckets() {
        assert_eq!(latency_status(0), "✅ Excellent");
        assert_eq!(latency_status(199), "✅ Excellent");
        assert_eq!(latency_status(200), "🟡 Good");
        assert_eq!(latency_status(499), "🟡 Good");
        assert_eq!(latency_status(500), "🔴 Poor");
        assert_eq!(yes_no(true), "Yes");
    }

    #[test]
    fn channel_names_are_dashed_lowercase() {
        let words = vec!["Staff".to_owned(), "Chat".to_owned()];
        assert_eq!(normalize_channel_name(&words), "staff-chat");
        assert_eq!(normalize_channel_name(&[]), "");
    }

    #[test]
    fn mentions_are_escaped() {
        assert_eq!(escape_mentions("hi @everyone"), "hi @\u{200B}everyone");
    }

    #[test]
    fn numbered_list_truncates() {
        let lines: Vec<String> = (1..=4).map(|n| format!("user{n}")).collect();
        assert_eq!(numbered_list(&lines, 4, "members"), "1. user1\n2. user2\n3. user3\n4. user4");
        assert_eq!(
            numbered_list(&lines, 2, "members"),
            "1. user1\n2. user2\n... and 2 more members"
        );
    }

    #[test]
    fn capped_join_handles_empty_and_overflow() {
        assert_eq!(capped_join(&[], 3, "None"), "None");
        let items: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(capped_join(&items, 3, "None"), "A, B, C");
        assert_eq!(capped_join(&items, 2, "None"), "A, B\n... and 1 more");
    }
}
