//! Plain-text rendering of the panel
//!
//! Everything here returns `String`s so the console and the one-shot
//! commands print the same layout.

use newsdesk_core::{NewsItem, NewsPanel, Toast, ToastLevel};
use std::fmt::Write;

pub const HEADER: &str = "Positive News Panel";
const RULE_WIDTH: usize = 60;

/// Full panel: header, form state, list
pub fn render_panel(panel: &NewsPanel, user: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER);
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Signed in as: {}", user.unwrap_or("(nobody)"));
    let _ = writeln!(out, "Title:   {}", field_preview(panel.title()));
    let _ = writeln!(out, "Content: {}", field_preview(panel.content()));
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    out.push_str(&render_list(panel.items()));
    out
}

/// Numbered list of items, or a placeholder when empty
pub fn render_list(items: &[NewsItem]) -> String {
    if items.is_empty() {
        return "No news yet.\n".to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| render_item(idx + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_item(number: usize, item: &NewsItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>2}. {}", number, item.title);
    for line in item.content.lines() {
        let _ = writeln!(out, "    {}", line);
    }
    let _ = writeln!(
        out,
        "    id: {} | by {} | {}",
        item.id,
        if item.author_id.is_empty() { "unknown" } else { item.author_id.as_str() },
        display_time(item)
    );
    out
}

pub fn render_toast(toast: &Toast) -> String {
    let mark = match toast.level {
        ToastLevel::Success => "[ok]",
        ToastLevel::Failure => "[error]",
    };
    format!("{} {}", mark, toast.message)
}

fn display_time(item: &NewsItem) -> String {
    match item.created_at_time() {
        Some(time) => time.format("%Y-%m-%d %H:%M UTC").to_string(),
        None if item.created_at.is_empty() => "undated".to_string(),
        None => item.created_at.clone(),
    }
}

fn field_preview(value: &str) -> String {
    if value.is_empty() {
        return "(empty)".to_string();
    }
    let first_line = value.lines().next().unwrap_or_default();
    if first_line.len() < value.len() {
        format!("{} ...", first_line)
    } else {
        first_line.to_string()
    }
}
