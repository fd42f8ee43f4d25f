use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use super::classify::{self, Classifier};
use super::dom::{self, DocIndex};
use super::locate::locate_table;
use super::rows::parse_table;
use crate::client::{Endpoints, Fetch, FetchError};
use crate::model::{Category, CourseIdentity, CourseRecord};
use crate::registry::FacultyRegistry;

const LIST_LINK_MARKER: &str = "p_list_courses";
const LINK_HORIZON: usize = 15;

/// A classified region of the degree page, opened by an `<a name=…>` marker.
#[derive(Debug, Clone)]
pub struct Zone<'a> {
    pub anchor_id: String,
    pub category: Category,
    pub heading: Option<String>,
    pub marker: ElementRef<'a>,
}

/// Records keyed by identity. The first record seen for an identity is kept.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<CourseRecord>,
    seen: HashSet<CourseIdentity>,
}

impl RecordSet {
    /// Add the records whose identity is new; returns how many were added.
    pub fn merge(&mut self, batch: Vec<CourseRecord>) -> usize {
        let before = self.records.len();
        for record in batch {
            if self.seen.insert(record.identity.clone()) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<CourseRecord> {
        self.records
    }
}

pub struct Extractor<'r, F> {
    fetcher: &'r F,
    endpoints: &'r Endpoints,
    registry: &'r FacultyRegistry,
    classifier: Classifier,
}

impl<'r, F: Fetch> Extractor<'r, F> {
    pub fn new(
        fetcher: &'r F,
        endpoints: &'r Endpoints,
        registry: &'r FacultyRegistry,
        classifier: Classifier,
    ) -> Self {
        Extractor {
            fetcher,
            endpoints,
            registry,
            classifier,
        }
    }

    /// Zone tables, then each zone's expand links, then every list link on the page.
    pub fn extract(&self, doc: &Html) -> Vec<CourseRecord> {
        let index = DocIndex::new(doc);
        let zones = find_zones(&index, &self.classifier);
        let mut set = RecordSet::default();
        let mut crawled: HashSet<String> = HashSet::new();

        for zone in &zones {
            match locate_table(&index, zone.marker) {
                Some(table) => {
                    let added = set.merge(parse_table(table, zone.category, self.registry));
                    debug!(
                        "zone {} ({}, {:?}): {} new courses",
                        zone.anchor_id, zone.category, zone.heading, added
                    );
                }
                None => debug!("zone {} ({}): no course table", zone.anchor_id, zone.category),
            }
        }
        info!("Pass 1: {} zones, {} courses", zones.len(), set.len());

        for zone in &zones {
            // a link without an area code inherits the category of the link before it
            let mut category = zone.category;
            for link in expand_links(&index, zone.marker) {
                if let Some(code) = classify::area_code(link) {
                    category = self.classifier.classify_area_code(code);
                }
                self.crawl_list(link, category, &mut set, &mut crawled);
            }
        }
        info!("Pass 2: {} courses after expand links", set.len());

        for link in list_links(index.elements()) {
            let Some(code) = classify::area_code(link) else {
                debug!("sweep skips {} (no area code)", link);
                continue;
            };
            let category = self.classifier.classify_sweep_code(code);
            self.crawl_list(link, category, &mut set, &mut crawled);
        }
        info!("Pass 3: {} courses after fallback sweep", set.len());

        set.into_records()
    }

    fn crawl_list(&self, href: &str, category: Category, set: &mut RecordSet, crawled: &mut HashSet<String>) {
        let url = self.endpoints.resolve(href);
        // every identity on an already merged page is in the set
        if crawled.contains(&url) {
            debug!("already crawled {}", url);
            return;
        }
        match self.fetch_list(&url, category) {
            Ok(rows) => {
                let added = set.merge(rows);
                debug!("{} ({}): {} new courses", url, category, added);
                crawled.insert(url);
            }
            Err(e) => warn!("Could not fetch course list {}: {}", url, e),
        }
    }

    fn fetch_list(&self, url: &str, category: Category) -> Result<Vec<CourseRecord>, FetchError> {
        let doc = self.fetcher.fetch(url)?;
        Ok(dom::find_first(doc.root_element(), "table")
            .map(|table| parse_table(table, category, self.registry))
            .unwrap_or_default())
    }
}

/// Every qualifying `<a name=…>` marker, classified.
pub fn find_zones<'a>(index: &DocIndex<'a>, classifier: &Classifier) -> Vec<Zone<'a>> {
    index
        .elements()
        .filter(|el| dom::is_tag(*el, "a"))
        .filter_map(|marker| {
            let name = marker.value().attr("name")?;
            if !classify::is_zone_anchor(name) {
                return None;
            }
            let heading = zone_heading(index, marker);
            let category = classifier.classify(name, None, heading.as_deref());
            Some(Zone {
                anchor_id: name.to_string(),
                category,
                heading,
                marker,
            })
        })
        .collect()
}

/// First bold text in the marker's parent, else the next bold text after it.
fn zone_heading<'a>(index: &DocIndex<'a>, marker: ElementRef<'a>) -> Option<String> {
    dom::parent_element(marker)
        .and_then(|p| dom::find_first(p, "b"))
        .or_else(|| index.following(marker).find(|e| dom::is_tag(*e, "b")))
        .map(dom::stripped_text)
}

/// Expand links of a zone: those in its enclosing table, or failing that, those
/// after the marker's parent and among the next few elements.
pub fn expand_links<'a>(index: &DocIndex<'a>, marker: ElementRef<'a>) -> Vec<&'a str> {
    let mut links: Vec<&'a str> = dom::find_parent(marker, "table")
        .map(|table| list_links(dom::find_all(table, "a")).collect())
        .unwrap_or_default();

    if links.is_empty() {
        if let Some(parent) = dom::parent_element(marker) {
            for sibling in dom::next_sibling_elements(parent) {
                links.extend(list_links(dom::find_all(sibling, "a")));
            }
            links.extend(list_links(index.following(marker).take(LINK_HORIZON)));
        }
    }

    let mut seen = HashSet::new();
    links.retain(|href| seen.insert(*href));
    links
}

/// `href` of every "list more courses" link among `elements`.
fn list_links<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> impl Iterator<Item = &'a str> {
    elements
        .filter(|el| dom::is_tag(*el, "a"))
        .filter_map(dom::href)
        .filter(|href| href.contains(LIST_LINK_MARKER))
}
