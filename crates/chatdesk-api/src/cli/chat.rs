//! Chat browsing CLI commands: list a user's chats, show a merged history.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use chatdesk_types::chat::{HistoryEntry, Modality, Sender};

use crate::cli::plural;
use crate::state::AppState;

const PREVIEW_CHARS: usize = 60;

/// List a user's chats with title, creation and last update time.
///
/// # Examples
///
/// ```bash
/// chatdesk chats 7
/// chatdesk chats 7 --json
/// ```
pub async fn list_chats(state: &AppState, user_id: i64, json: bool) -> Result<()> {
    let chats = state.projection.list_chats(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chats)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!("  {} No chats for user {user_id}.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Chat").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Created").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for chat in &chats {
        let updated = chat
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&chat.chat_id).fg(Color::DarkGrey),
            Cell::new(&chat.title).fg(Color::Cyan),
            Cell::new(chat.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(updated),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!("  {}", style(plural(chats.len(), "chat")).bold());
    println!();
    Ok(())
}

/// Print a chat's text and voice messages in timestamp order.
///
/// # Examples
///
/// ```bash
/// chatdesk history 0f3c-... --user 7
/// ```
pub async fn show_history(state: &AppState, chat_id: &str, user_id: i64, json: bool) -> Result<()> {
    let entries = state.history.full_history(chat_id, user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        println!(
            "  {} No messages in chat '{}' for user {user_id}.",
            style("i").blue().bold(),
            chat_id
        );
        println!();
        return Ok(());
    }

    println!();
    for entry in &entries {
        println!("  {}", format_entry(entry));
    }
    println!();
    println!("  {}", style(plural(entries.len(), "message")).bold());
    println!();
    Ok(())
}

fn format_entry(entry: &HistoryEntry) -> String {
    let when = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let who = match entry.sender {
        Sender::User => style("you").cyan().bold(),
        Sender::Bot => style("bot").magenta().bold(),
    };
    let marker = match entry.modality {
        Modality::Text => "",
        Modality::Voice => " (voice)",
    };
    let intent = entry
        .intent
        .as_deref()
        .map(|i| format!(" [{i}]"))
        .unwrap_or_default();

    format!(
        "{} {who}{marker}{}: {}",
        style(when).dim(),
        style(intent).dim(),
        preview(&entry.content)
    )
}

fn preview(content: &str) -> String {
    let single_line = content.replace('\n', " ");
    if single_line.chars().count() > PREVIEW_CHARS {
        let cut: String = single_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(100);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), PREVIEW_CHARS);
    }
}
