//! Label-anchored text fields on the per-course catalogue pages.
//!
//! A value sits between the first and second `<br>` after its label span,
//! mixed freely with text nodes and inline elements.

use scraper::node::Node;
use scraper::{ElementRef, Html};

use super::dom;

pub const PREREQUISITES_LABEL: &str = "Prerequisites";
pub const COREQUISITES_LABEL: &str = "Corequisites";
pub const LAST_OFFERED_LABEL: &str = "Last Offered Terms";

/// Sibling nodes after a label, reduced to what the extractor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Break,
    Text(String),
    Element(String),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeValue,
    InValue,
}

/// Text following the first span that mentions `label`; empty when absent.
pub fn extract_labeled_text(doc: &Html, label: &str) -> String {
    let Some(span) = find_with_text(doc, "span", label) else {
        return String::new();
    };
    let kinds: Vec<NodeKind> = span
        .next_siblings()
        .map(|n| node_kind(ElementRef::wrap(n), n.value()))
        .collect();
    collect_value(&kinds)
}

/// Two-state walk: the first break opens the value, the second ends it.
pub fn collect_value(kinds: &[NodeKind]) -> String {
    let mut state = State::BeforeValue;
    let mut parts: Vec<&str> = Vec::new();
    for kind in kinds {
        match (kind, state) {
            (NodeKind::Break, State::BeforeValue) => state = State::InValue,
            (NodeKind::Break, State::InValue) => break,
            (NodeKind::Text(t) | NodeKind::Element(t), _) => parts.push(t.as_str()),
            (NodeKind::Other, _) => {}
        }
    }
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn node_kind(element: Option<ElementRef<'_>>, node: &Node) -> NodeKind {
    match (element, node) {
        (Some(el), _) if dom::is_tag(el, "br") => NodeKind::Break,
        (Some(el), _) => NodeKind::Element(dom::joined_text(el, " ")),
        (None, Node::Text(t)) => NodeKind::Text(t.trim().to_string()),
        _ => NodeKind::Other,
    }
}

/// The term listed in the row right under the "Last Offered Terms" header.
pub fn extract_last_offered_term(doc: &Html) -> String {
    last_offered_term(doc).unwrap_or_default()
}

fn last_offered_term(doc: &Html) -> Option<String> {
    let header = find_with_text(doc, "b", LAST_OFFERED_LABEL)?;
    let table = dom::find_parent(header, "table")?;
    let rows: Vec<_> = dom::find_all(table, "tr").collect();
    let header_idx = rows
        .iter()
        .position(|row| row.text().collect::<String>().contains(LAST_OFFERED_LABEL))?;
    let data_row = rows.get(header_idx + 1)?;
    let cell = dom::find_first(*data_row, "td")?;
    Some(dom::stripped_text(cell))
}

fn find_with_text<'a>(doc: &'a Html, tag: &str, needle: &str) -> Option<ElementRef<'a>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| dom::is_tag(*el, tag))
        .find(|el| el.text().collect::<String>().contains(needle))
}
