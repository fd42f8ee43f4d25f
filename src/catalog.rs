use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use scraper::Html;
use tracing::info;

use crate::client::{Endpoints, Fetch};
use crate::model::Program;
use crate::parser::dom::{self, DocIndex};

static PROGRAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"P_PROGRAM=([^&]+)").unwrap());

/// Fetch the degree index and return every program linked from it.
pub fn fetch_programs<F: Fetch>(fetcher: &F, endpoints: &Endpoints) -> Result<Vec<Program>> {
    let url = endpoints.degree_index();
    info!("Fetching degree index: {}", url);
    let doc = fetcher.fetch(&url).context("Failed to fetch degree index")?;
    let programs = parse_programs(&doc);
    info!("Programs on index: {}", programs.len());
    Ok(programs)
}

/// Program links in page order. A code linked twice keeps its first position
/// and its last title.
pub fn parse_programs(doc: &Html) -> Vec<Program> {
    let mut programs: Vec<Program> = Vec::new();
    for link in DocIndex::new(doc).elements().filter(|e| dom::is_tag(*e, "a")) {
        let Some(code) = dom::href(link)
            .and_then(|h| PROGRAM_RE.captures(h))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };
        let title = dom::joined_text(link, " ").split_whitespace().collect::<Vec<_>>().join(" ");
        match programs.iter_mut().find(|p| p.code == code) {
            Some(existing) => existing.title = title,
            None => programs.push(Program { code, title }),
        }
    }
    programs
}

/// Most recent term offered for `program`, if the term selector lists any.
pub fn fetch_latest_term<F: Fetch>(fetcher: &F, endpoints: &Endpoints, program: &str) -> Result<Option<String>> {
    let doc = fetcher
        .fetch(&endpoints.select_term(program))
        .with_context(|| format!("Failed to fetch terms for {}", program))?;
    Ok(parse_latest_term(&doc))
}

pub fn parse_latest_term(doc: &Html) -> Option<String> {
    let index = DocIndex::new(doc);
    let select = index
        .elements()
        .find(|e| dom::is_tag(*e, "select") && e.value().attr("name") == Some("P_TERM"))?;
    let option = dom::find_first(select, "option")?;
    option.value().attr("value").map(str::to_string)
}
