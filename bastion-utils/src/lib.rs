/// Embed palette and builders shared across commands.
pub mod embed;
/// Shared formatting helpers (durations, limits, mentions).
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Shared time helpers.
pub mod time;

/// Split a prefixed message into a lowercased command token and its arguments.
///
/// Returns `None` when the content does not start with [`COMMAND_PREFIX`] or
/// carries no command token.
pub fn split_command(content: &str) -> Option<(String, Vec<String>)> {
    let body = content.trim_start().strip_prefix(COMMAND_PREFIX)?;
    let mut tokens = body.split_whitespace();
    let command = tokens.next()?.to_ascii_lowercase();
    let args = tokens.map(str::to_owned).collect();
    Some((command, args))
}

#[cfg(test)]
mod tests {
    use super::split_command;

    #[test]
    fn splits_prefixed_commands() {
        assert_eq!(
            split_command("!Slowmode 30"),
            Some(("slowmode".to_owned(), vec!["30".to_owned()]))
        );
        assert_eq!(
            split_command("  !topic  hello   world "),
            Some((
                "topic".to_owned(),
                vec!["hello".to_owned(), "world".to_owned()]
            ))
        );
    }

    #[test]
    fn ignores_unprefixed_or_empty() {
        assert_eq!(split_command("lock"), None);
        assert_eq!(split_command("!"), None);
        assert_eq!(split_command("!   "), None);
    }
}
