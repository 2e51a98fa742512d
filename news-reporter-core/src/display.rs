use chrono::Local;

use crate::format::{format_snippet, format_text};
use crate::model::SearchResult;

const RULE_WIDTH: usize = 50;
const SECTION_RULE_WIDTH: usize = 30;

/// Render a finished result as terminal text, wrapped to `width` columns.
pub fn render_result(result: &SearchResult, width: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let section_rule = "-".repeat(SECTION_RULE_WIDTH);
    let retrieved = result.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");

    let mut out = format!("Search results (retrieved {retrieved})\n{rule}\n");

    if result.citations.is_empty() {
        out.push_str("\nNo web sources found.\n");
    } else {
        out.push_str(&format!("\nWeb sources ({}):\n{section_rule}\n", result.citations.len()));
        for (i, c) in result.citations.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n   {}\n", i + 1, c.title, c.url));
            if !c.snippet.is_empty() {
                out.push_str(&format!("   {}\n", format_snippet(&c.snippet, width)));
            }
        }
    }

    if !result.summary.is_empty() {
        out.push_str(&format!("\nSummary:\n{section_rule}\n{}\n", format_text(&result.summary, width)));
    }

    out.push_str(&rule);
    out.push('\n');
    out
}
