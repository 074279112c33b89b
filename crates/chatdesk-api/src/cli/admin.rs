//! Admin reporting CLI commands: totals and recent conversations.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::state::AppState;

/// Display user, conversation, and text message totals.
pub async fn metrics(state: &AppState, json: bool) -> Result<()> {
    let metrics = state.projection.admin_metrics().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("── Totals ──").dim());
    println!("  Users:         {}", style(metrics.total_users).bold());
    println!("  Conversations: {}", style(metrics.total_conversations).bold());
    println!("  Messages:      {}", style(metrics.total_messages).bold());
    println!();
    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!();
    Ok(())
}

/// Display the most recently active conversations.
pub async fn recent(state: &AppState, limit: Option<i64>, json: bool) -> Result<()> {
    let recent = state.projection.recent_conversations(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    if recent.is_empty() {
        println!();
        println!("  {} No conversations yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Chat").fg(Color::White),
        Cell::new("User").fg(Color::White),
        Cell::new("Last activity").fg(Color::White),
    ]);

    for conversation in &recent {
        let last = conversation
            .last_activity_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&conversation.chat_id).fg(Color::DarkGrey),
            Cell::new(&conversation.username).fg(Color::Cyan),
            Cell::new(last),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}
