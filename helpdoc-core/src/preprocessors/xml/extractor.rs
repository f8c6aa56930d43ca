//! Tree extraction for `t24help` documents.
//!
//! Schema handled:
//!
//! ```text
//! t24help
//! ├── header   > product, table
//! ├── overview > ovdesc > p*
//! └── menu     > t*  (field, desc > (p | table)*)
//! ```
//!
//! Missing pieces produce empty values. Only unparseable markup is an error.

use super::tree::{NodeId, XmlTree};
use crate::error::ParseResult;
use crate::text::normalize;
use crate::types::{ExtractedDocument, ExtractedEntry, RawFragment};

const ROOT_TAG: &str = "t24help";

/// Paragraph text upstream uses to mean "no content".
pub const PLACEHOLDER_PARAGRAPH: &str = "/";

/// Parse `markup` and pull out header, overview and raw entry fragments.
pub fn extract_document(markup: &str) -> ParseResult<ExtractedDocument> {
    let tree = XmlTree::parse(markup)?;

    let Some(help) = tree.find_self_or_descendant(tree.root(), ROOT_TAG) else {
        log::warn!(
            "No <{ROOT_TAG}> element found (root is <{}>), document is empty",
            tree.name(tree.root())
        );
        return Ok(ExtractedDocument::default());
    };

    let product = header_field(&tree, help, "product");
    let table = header_field(&tree, help, "table");
    let overview_paragraphs = extract_overview(&tree, help);
    let entries = extract_entries(&tree, help);

    log::debug!(
        "Extracted header '{product}'/'{table}', {} overview paragraphs, {} entries",
        overview_paragraphs.len(),
        entries.len()
    );

    Ok(ExtractedDocument {
        product,
        table,
        overview_paragraphs,
        entries,
    })
}

/// Trimmed text of the first `header > name`, empty when absent.
fn header_field(tree: &XmlTree, help: NodeId, name: &str) -> String {
    tree.children_named(help, "header")
        .flat_map(|header| tree.children_named(header, name).collect::<Vec<_>>())
        .next()
        .map(|id| tree.text_content(id).trim().to_string())
        .unwrap_or_default()
}

fn extract_overview(tree: &XmlTree, help: NodeId) -> Vec<String> {
    let mut paragraphs = Vec::new();
    for overview in tree.children_named(help, "overview") {
        for ovdesc in tree.children_named(overview, "ovdesc") {
            for p in tree.children_named(ovdesc, "p") {
                let text = tree.text_content(p).trim().to_string();
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
        }
    }
    paragraphs
}

fn extract_entries(tree: &XmlTree, help: NodeId) -> Vec<ExtractedEntry> {
    let mut entries = Vec::new();
    for menu in tree.children_named(help, "menu") {
        for t in tree.children_named(menu, "t") {
            let label = tree
                .first_descendant(t, "field")
                .map(|field| tree.text_content(field).trim().to_string())
                .unwrap_or_default();
            if label.is_empty() {
                continue;
            }

            let (fragments, used_fallback) = match tree.first_descendant(t, "desc") {
                Some(desc) => description_fragments(tree, desc),
                None => (Vec::new(), false),
            };
            if used_fallback {
                log::warn!("Entry '{label}': recovered content via deep search");
            }

            entries.push(ExtractedEntry {
                label,
                fragments: drop_placeholders(fragments),
                used_fallback,
            });
        }
    }
    entries
}

/// Fragments of one `desc` element plus whether the fallback pass produced them.
pub fn description_fragments(tree: &XmlTree, desc: NodeId) -> (Vec<RawFragment>, bool) {
    with_fallback(
        || direct_children_pass(tree, desc),
        || deep_search_pass(tree, desc),
    )
}

/// Use `fallback` only when `primary` yields nothing.
fn with_fallback<P, F>(primary: P, fallback: F) -> (Vec<RawFragment>, bool)
where
    P: FnOnce() -> Vec<RawFragment>,
    F: FnOnce() -> Vec<RawFragment>,
{
    let fragments = primary();
    if !fragments.is_empty() {
        return (fragments, false);
    }
    let recovered = fallback();
    let used = !recovered.is_empty();
    (recovered, used)
}

/// Immediate `p` and `table` children of `desc`.
fn direct_children_pass(tree: &XmlTree, desc: NodeId) -> Vec<RawFragment> {
    tree.child_elements(desc)
        .filter_map(|child| fragment_for(tree, child))
        .collect()
}

/// Every `p` or `table` below `desc`, at any depth. A paragraph is taken
/// whole, so one nested in another is not read twice. Tables inside a matched
/// paragraph are kept out of its text and follow it as their own fragments.
fn deep_search_pass(tree: &XmlTree, desc: NodeId) -> Vec<RawFragment> {
    let is_table = |id| tree.is_named(id, "table");
    let mut fragments = Vec::new();
    for id in tree.outermost_descendants(desc, |id| tree.is_named(id, "p") || is_table(id)) {
        if is_table(id) {
            fragments.extend(fragment_for(tree, id));
            continue;
        }
        let text = normalize(&tree.text_content_excluding(id, is_table));
        if !text.is_empty() {
            fragments.push(RawFragment::Paragraph(text));
        }
        fragments.extend(
            tree.outermost_descendants(id, is_table)
                .into_iter()
                .filter_map(|table| fragment_for(tree, table)),
        );
    }
    fragments
}

fn fragment_for(tree: &XmlTree, id: NodeId) -> Option<RawFragment> {
    if tree.is_named(id, "p") {
        let text = normalize(&tree.text_content(id));
        (!text.is_empty()).then_some(RawFragment::Paragraph(text))
    } else if tree.is_named(id, "table") {
        Some(RawFragment::Table(tree.raw_markup(id).to_string()))
    } else {
        None
    }
}

fn drop_placeholders(fragments: Vec<RawFragment>) -> Vec<RawFragment> {
    fragments
        .into_iter()
        .filter(|fragment| fragment.paragraph_text() != Some(PLACEHOLDER_PARAGRAPH))
        .collect()
}
