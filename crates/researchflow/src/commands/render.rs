//! Plain-text rendering of transcripts and saved items

use researchflow_core::{ResultItem, ResultSet, Turn};
use researchflow_saved::{SavedIndex, SavedItem};
use std::fmt::Write;

const ABSTRACT_PREVIEW: usize = 240;

pub fn turns(turns: &[Turn], saved: Option<&SavedIndex>) -> String {
    let mut out = String::new();
    for turn in turns {
        match turn {
            Turn::UserQuery { text } => {
                let _ = writeln!(out, "> {text}\n");
            }
            Turn::ResultSet(rs) => out.push_str(&result_set(rs, saved)),
            Turn::AssistantMessage { text } => {
                let _ = writeln!(out, "{text}\n");
            }
            Turn::ErrorNotice { text } => {
                let _ = writeln!(out, "! {text}\n");
            }
        }
    }
    out
}

pub fn result_set(rs: &ResultSet, saved: Option<&SavedIndex>) -> String {
    let mut out = String::new();
    if !rs.summary_message.is_empty() {
        let _ = writeln!(out, "{}\n", rs.summary_message);
    }
    if rs.items.is_empty() {
        out.push_str("No articles found.\n\n");
        return out;
    }
    for (i, item) in rs.items.iter().enumerate() {
        let marker = match saved {
            Some(index) if index.contains(&item.url) => "*",
            _ => " ",
        };
        let _ = writeln!(out, "{marker}{:>3}. {}", i + 1, article(item));
    }
    if rs.has_more() {
        out.push_str("\n(more results available: `researchflow more`)\n");
    }
    out.push('\n');
    out
}

pub fn article(item: &ResultItem) -> String {
    let title = if item.title.is_empty() {
        "(untitled)"
    } else {
        item.title.as_str()
    };
    let mut line = title.to_string();
    let year = item
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".to_string());
    let _ = write!(
        line,
        "\n      {} ({year}) · {} citations",
        item.author_line(),
        item.citation_count
    );
    if let Some(journal) = item.journal.as_deref().filter(|j| !j.is_empty()) {
        let _ = write!(line, " · {journal}");
    }
    let _ = write!(line, "\n      {}", item.url);
    if let Some(text) = item.abstract_text.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(line, "\n      {}", preview(text));
    }
    line
}

pub fn saved_items(items: &[SavedItem]) -> String {
    if items.is_empty() {
        return "No saved articles.\n".to_string();
    }
    let mut out = String::new();
    for saved in items {
        let _ = writeln!(
            out,
            "- {}\n  saved {}",
            article(&saved.item),
            saved.saved_at.format("%Y-%m-%d %H:%M")
        );
    }
    out
}

fn preview(text: &str) -> String {
    if text.chars().count() <= ABSTRACT_PREVIEW {
        return text.to_string();
    }
    let cut: String = text.chars().take(ABSTRACT_PREVIEW).collect();
    format!("{}…", cut.trim_end())
}
