use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;
use tracing::debug;

use super::dom::{self, DocIndex};

static COURSE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]+\s*\d+").unwrap());

const PROXIMITY_HORIZON: usize = 10;
const GLOBAL_TABLE_HORIZON: usize = 20;

const PROXIMITY_HEADERS: &[&str] = &["Course", "Name", "ECTS", "SU Credits"];
const SIBLING_HEADERS: &[&str] = &["Course", "Name"];
const GLOBAL_HEADERS: &[&str] = &["Course", "Name", "ECTS"];

type Strategy = for<'a> fn(&DocIndex<'a>, ElementRef<'a>) -> Option<ElementRef<'a>>;

/// Tried in order; the first hit wins.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("proximity", proximity_scan),
    ("enclosing_table", enclosing_table_scan),
    ("global", bounded_table_scan),
];

/// Find the course table belonging to a zone marker.
pub fn locate_table<'a>(index: &DocIndex<'a>, marker: ElementRef<'a>) -> Option<ElementRef<'a>> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let table = strategy(index, marker)?;
        debug!("table found by {} strategy", name);
        Some(table)
    })
}

/// The next few elements after the marker: a table with course headers, or one
/// whose rows look like course rows.
pub fn proximity_scan<'a>(index: &DocIndex<'a>, marker: ElementRef<'a>) -> Option<ElementRef<'a>> {
    index
        .following(marker)
        .take(PROXIMITY_HORIZON)
        .filter(|el| dom::is_tag(*el, "table"))
        .find(|table| dom::has_header(*table, PROXIMITY_HEADERS) || has_course_rows(*table))
}

/// Sibling tables of the table that encloses the marker.
pub fn enclosing_table_scan<'a>(_index: &DocIndex<'a>, marker: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let parent_table = dom::find_parent(marker, "table")?;
    dom::next_sibling_elements(parent_table).find_map(sibling_course_table)
}

/// A `<tr>` sibling is checked through its first nested table, a `<table>`
/// sibling directly.
fn sibling_course_table(sibling: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let table = if dom::is_tag(sibling, "tr") {
        dom::find_first(sibling, "table")?
    } else if dom::is_tag(sibling, "table") {
        sibling
    } else {
        return None;
    };
    dom::has_header(table, SIBLING_HEADERS).then_some(table)
}

/// The next tables in document order, however far away.
pub fn bounded_table_scan<'a>(index: &DocIndex<'a>, marker: ElementRef<'a>) -> Option<ElementRef<'a>> {
    index
        .following(marker)
        .filter(|el| dom::is_tag(*el, "table"))
        .take(GLOBAL_TABLE_HORIZON)
        .find(|table| dom::has_header(*table, GLOBAL_HEADERS))
}

fn has_course_rows(table: ElementRef<'_>) -> bool {
    let rows: Vec<_> = dom::find_all(table, "tr").collect();
    if rows.len() < 2 {
        return false;
    }
    rows[1..].iter().any(|row| {
        let cells: Vec<_> = dom::find_all(*row, "td").collect();
        if cells.len() < 5 {
            return false;
        }
        let code = dom::stripped_text(cells[1]).replace('\u{a0}', " ");
        !code.is_empty() && COURSE_CODE_RE.is_match(&code)
    })
}
