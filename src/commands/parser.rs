//! Parser for bot commands in comment text.
//!
//! This module provides a pure parser that extracts structured commands from
//! unstructured GitHub comment text.

use super::types::Command;

/// Parses the first bot command found in comment text.
///
/// # Arguments
///
/// * `text` - The comment text to parse
/// * `bot_name` - The bot name without the `@` prefix (e.g., `"classisland-bot"`)
///
/// # Parsing Rules
///
/// - The trigger `@{bot_name}` is case-insensitive (like GitHub mentions)
/// - The trigger must be at a word boundary (not preceded by alphanumeric chars)
/// - The command is a `/`-prefixed word after whitespace; its name is
///   case-insensitive and anything after it is ignored
/// - If multiple mentions are present, the first one carrying a command wins
/// - Returns `None` if no command is found
///
/// # Examples
///
/// ```
/// use issue_voting_bot::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("@classisland-bot /ping", "classisland-bot"), Some(Command::Ping));
/// assert_eq!(
///     parse_command("@ClassIsland-Bot /track_voting please", "classisland-bot"),
///     Some(Command::TrackVoting)
/// );
/// assert_eq!(parse_command("@classisland-bot ping", "classisland-bot"), None);
/// // Not a valid mention (preceded by alphanumeric):
/// assert_eq!(parse_command("foo@classisland-bot /ping", "classisland-bot"), None);
/// ```
pub fn parse_command(text: &str, bot_name: &str) -> Option<Command> {
    let trigger = format!("@{}", bot_name);
    let mut search_start = 0;
    while let Some(abs_pos) = find_trigger(text, search_start, &trigger) {
        let after_trigger = &text[abs_pos + trigger.len()..];

        if let Some(cmd) = try_parse_after_trigger(after_trigger) {
            return Some(cmd);
        }

        search_start = abs_pos + trigger.len();
    }
    None
}

/// Finds the next occurrence of the trigger (case-insensitive) at a valid word boundary.
/// Returns the byte position of the `@` character if found.
fn find_trigger(text: &str, start: usize, trigger: &str) -> Option<usize> {
    let mut search_pos = start;

    while search_pos < text.len() {
        let at_pos = text[search_pos..].find('@')?;
        let abs_pos = search_pos + at_pos;

        // `get` returns None if the end lands inside a multi-byte character.
        if let Some(candidate) = text.get(abs_pos..abs_pos + trigger.len())
            && candidate.eq_ignore_ascii_case(trigger)
        {
            let valid_boundary = text[..abs_pos]
                .chars()
                .next_back()
                .is_none_or(|prev| !prev.is_alphanumeric());
            if valid_boundary {
                return Some(abs_pos);
            }
        }

        search_pos = abs_pos + 1;
    }
    None
}

/// Attempts to parse `/<name>` from text immediately following the trigger.
fn try_parse_after_trigger(text: &str) -> Option<Command> {
    // Must have at least one whitespace character after trigger
    let text = text.strip_prefix(|c: char| c.is_ascii_whitespace())?;
    let text = text.trim_start_matches([' ', '\t']);
    let text = text.strip_prefix('/')?;

    let (name, _) = split_first_word(text);
    if name.is_empty() {
        return None;
    }
    Some(Command::from_name(&name.to_ascii_lowercase()))
}

/// Splits text at the first whitespace, returning (word, rest).
/// If no whitespace, returns (text, "").
fn split_first_word(text: &str) -> (&str, &str) {
    match text.find(|c: char| c.is_whitespace()) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    }
}
