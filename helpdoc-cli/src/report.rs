// Text helpers for the CLI: output naming and query listings.

use helpdoc_core::diagnostics::SelfCheck;
use helpdoc_core::query::{render_highlighted, table_of_contents};
use helpdoc_core::{DocumentModel, OutputFormat};
use std::path::Path;

pub const HIGHLIGHT_OPEN: &str = "[[";
pub const HIGHLIGHT_CLOSE: &str = "]]";

/// Output path meaning "write the rendered document to stdout".
pub const STDOUT_PATH: &str = "-";

/// True when the rendered document goes to stdout, so status lines must not.
pub fn writes_to_stdout(output: Option<&str>) -> bool {
    output == Some(STDOUT_PATH)
}

/// `<stem>[_<config stem>]_helpdoc.<ext>` next to the working directory.
pub fn default_output_path(input: &str, config: Option<&str>, format: OutputFormat) -> String {
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let config_suffix = config
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("_{s}"))
        .unwrap_or_default();
    format!("{input_name}{config_suffix}_helpdoc.{}", format.extension())
}

/// Filtered table of contents, one line per item, matches wrapped in `[[...]]`.
pub fn render_query_listing(model: &DocumentModel, query: &str) -> Vec<String> {
    table_of_contents(model, query)
        .into_iter()
        .map(|item| {
            let label = render_highlighted(&item.label, query, HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE);
            let marker = if item.obsolete { " (obsolete)" } else { "" };
            format!("#{}  {label}{marker}", item.anchor)
        })
        .collect()
}

/// Matching paragraph snippets for one entry, highlighted.
pub fn matching_paragraphs(paragraphs: &[String], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    paragraphs
        .iter()
        .filter(|p| p.to_lowercase().contains(&needle))
        .map(|p| render_highlighted(p, query, HIGHLIGHT_OPEN, HIGHLIGHT_CLOSE))
        .collect()
}

pub fn format_self_check(check: &SelfCheck) -> String {
    let status = if check.passed { "✅" } else { "❌" };
    format!("{status} {}: {}", check.name, check.detail)
}
