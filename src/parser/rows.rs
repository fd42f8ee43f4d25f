use scraper::ElementRef;

use super::dom;
use crate::model::{Category, CourseIdentity, CourseRecord};
use crate::registry::FacultyRegistry;

/// Markup of a first cell flagged with a centered asterisk. Both spellings occur.
const ASTERISK_MARKERS: &[&str] = &[
    "<center>&nbsp;*&nbsp;</center>",
    "<center> * </center>",
];

const MIN_CELLS: usize = 5;

/// Turn a course table into records tagged with `category`. Rows that do not
/// look like course rows are skipped.
pub fn parse_table(table: ElementRef<'_>, category: Category, registry: &FacultyRegistry) -> Vec<CourseRecord> {
    let rows: Vec<_> = dom::find_all(table, "tr").collect();
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let skip = usize::from(dom::find_first(*first, "th").is_some());

    rows[skip..]
        .iter()
        .filter_map(|row| parse_row(*row, category, registry))
        .collect()
}

fn parse_row(row: ElementRef<'_>, category: Category, registry: &FacultyRegistry) -> Option<CourseRecord> {
    let cells: Vec<ElementRef<'_>> = dom::find_all(row, "td").collect();
    if cells.len() < MIN_CELLS {
        return None;
    }
    let texts: Vec<String> = cells.iter().map(|c| dom::stripped_text(*c)).collect();
    let identity = split_identity(&texts[1])?;

    let marked = has_asterisk(cells[0]);
    let faculty_course = registry.faculty_of(&identity).map(str::to_string);
    let category = apply_override(category, marked, faculty_course.is_some());

    Some(CourseRecord {
        identity,
        name: texts[2].clone(),
        ects: texts[3].clone(),
        engineering: 0,
        basic_science: 0,
        su_credit: texts[4].clone(),
        faculty: texts.get(5).cloned().unwrap_or_default(),
        category,
        faculty_course,
        details: None,
    })
}

/// "CS 201" → (CS, 201); "MATH 2 01" → (MATH, 201).
pub fn split_identity(cell: &str) -> Option<CourseIdentity> {
    let normalized = cell.replace('\u{a0}', " ");
    let mut parts = normalized.split_whitespace();
    let major = parts.next()?;
    let code: String = parts.collect();
    Some(CourseIdentity::new(major, code))
}

pub fn has_asterisk(cell: ElementRef<'_>) -> bool {
    let markup = cell.html();
    ASTERISK_MARKERS.iter().any(|m| markup.contains(m))
}

/// Marked faculty courses listed under "required" are really core electives.
/// Under "area" and "free" the rule keeps the category as is.
pub fn apply_override(category: Category, marked: bool, faculty_course: bool) -> Category {
    if !(marked && faculty_course) {
        return category;
    }
    match category {
        Category::Required => Category::Core,
        Category::Area => Category::Area,
        Category::Free => Category::Free,
        other => other,
    }
}
