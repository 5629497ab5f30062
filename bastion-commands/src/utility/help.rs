use poise::serenity_prelude as serenity;

use bastion_core::Error;
use bastion_utils::embed::DEFAULT_EMBED_COLOR;

use crate::session::CommandSession;
use crate::{CommandMeta, TEXT_ROUTER, commands};

const HELP_COMMANDS_PER_PAGE: usize = 20;

pub async fn help(session: &CommandSession) -> Result<(), Error> {
    let query = session.token(0);
    let parsed_page = query.and_then(|raw| raw.parse::<usize>().ok().filter(|page| *page >= 1));
    let category = match (query, parsed_page) {
        (Some(raw), None) => Some(raw.to_ascii_lowercase()),
        _ => None,
    };
    let category = category.as_deref();

    let mut categories: Vec<&str> = commands().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();

    if let Some(wanted_category) = category
        && !categories.contains(&wanted_category)
    {
        session
            .say(unknown_category_message(wanted_category, &categories))
            .await?;
        return Ok(());
    }

    let commands = sorted_commands(category);
    if commands.is_empty() {
        session.say(no_commands_message(category)).await?;
        return Ok(());
    }

    let requested_page = parsed_page.unwrap_or(1);
    let total = total_pages(commands.len(), HELP_COMMANDS_PER_PAGE);

    if requested_page > total {
        session
            .say(page_out_of_range_message(requested_page, total))
            .await?;
        return Ok(());
    }

    let (start, end) = page_window(commands.len(), HELP_COMMANDS_PER_PAGE, requested_page);
    let embed = serenity::CreateEmbed::new()
        .title("Available Commands")
        .description(grouped_help_description(&commands[start..end]))
        .color(DEFAULT_EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{} • Use !help <page|category>",
            requested_page, total
        )));

    session.send_embed(embed).await
}

fn total_pages(total_items: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    let pages = total_items.div_ceil(per_page);
    pages.max(1)
}

fn page_window(total_items: usize, per_page: usize, page: usize) -> (usize, usize) {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = (start + per_page).min(total_items);
    (start, end)
}

fn sorted_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut filtered: Vec<&'static CommandMeta> = commands()
        .filter(|cmd| match category {
            Some(wanted) => cmd.category == wanted,
            None => true,
        })
        .collect();

    filtered.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    filtered
}

/// Aliases registered for a prefix command, across every text dispatcher.
fn aliases_for(name: &str) -> Vec<&'static str> {
    TEXT_ROUTER
        .dispatchers()
        .iter()
        .flat_map(|dispatcher| dispatcher.aliases_of(name))
        .collect()
}

fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

fn no_commands_message(category: Option<&str>) -> String {
    match category {
        Some(cat) => format!("No commands found in category: {}", display_category(cat)),
        None => "No commands found at all.".to_owned(),
    }
}

fn page_out_of_range_message(requested_page: usize, total_pages: usize) -> String {
    format!(
        "Page {} does not exist. Available pages: 1-{}.",
        requested_page, total_pages
    )
}

fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        let aliases = aliases_for(command.name);
        if aliases.is_empty() {
            out.push_str(&format!(
                "`{}`: {} · `{}`\n",
                command.name, command.desc, command.usage
            ));
        } else {
            out.push_str(&format!(
                "`{}` ({}): {} · `{}`\n",
                command.name,
                aliases.join(", "),
                command.desc,
                command.usage
            ));
        }
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        HELP_COMMANDS_PER_PAGE, display_category, grouped_help_description, page_window,
        sorted_commands, total_pages, unknown_category_message,
    };
    use crate::{CommandMeta, TEXT_ROUTER, commands};

    #[test]
    fn paging_math() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(41, 20), 3);
        assert_eq!(page_window(41, 20, 3), (40, 41));
        assert_eq!(page_window(5, 20, 4), (5, 5));
    }

    #[test]
    fn categories_are_capitalized() {
        assert_eq!(display_category("channels"), "Channels");
        assert_eq!(
            unknown_category_message("fun", &["channels", "roles"]),
            "Unknown category: Fun\nValid categories: Channels, Roles"
        );
    }

    #[test]
    fn grouped_description_lists_aliases() {
        let lock = CommandMeta {
            name: "lock",
            desc: "Lock the current channel.",
            category: "channels",
            usage: "!lock",
        };
        let description = grouped_help_description(&[&lock]);
        assert!(description.starts_with("**Channels**\n`lock` ("));
        assert!(description.contains("locktext"));
        assert!(description.ends_with("Lock the current channel. · `!lock`"));
    }

    #[test]
    fn every_page_fits_in_an_embed() {
        let commands = sorted_commands(None);
        let pages = total_pages(commands.len(), HELP_COMMANDS_PER_PAGE);
        for page in 1..=pages {
            let (start, end) = page_window(commands.len(), HELP_COMMANDS_PER_PAGE, page);
            let description = grouped_help_description(&commands[start..end]);
            assert!(description.chars().count() <= 4096, "page {page} is too long");
        }
    }

    #[test]
    fn category_filter_keeps_only_that_category() {
        let roles = sorted_commands(Some("roles"));
        assert!(!roles.is_empty());
        assert!(roles.iter().all(|command| command.category == "roles"));
    }

    #[test]
    fn every_prefix_command_is_documented() {
        let documented: Vec<&str> = commands().map(|command| command.name).collect();
        for dispatcher in TEXT_ROUTER.dispatchers() {
            for name in dispatcher.canonical_names() {
                assert!(documented.contains(&name), "{name} has no help entry");
            }
        }
        for name in documented {
            assert!(TEXT_ROUTER.recognizes(name), "{name} is documented but not routed");
        }
    }
}
