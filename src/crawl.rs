use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::client::{Endpoints, Fetch, FetchError};
use crate::model::{Category, CourseDetails, CourseIdentity, CourseRecord};
use crate::parser::classify::Classifier;
use crate::parser::detail::{
    extract_labeled_text, extract_last_offered_term, COREQUISITES_LABEL, PREREQUISITES_LABEL,
};
use crate::parser::merge::Extractor;
use crate::registry::FacultyRegistry;

/// Everything a program crawl needs, borrowed from `main`.
pub struct CrawlContext<'r, F> {
    pub fetcher: &'r F,
    pub endpoints: &'r Endpoints,
    pub registry: &'r FacultyRegistry,
    pub detail_majors: &'r HashSet<String>,
}

/// Fetch one program's degree page, extract its courses and enrich the
/// eligible ones with catalogue details.
pub fn crawl_program<F: Fetch + Sync>(
    ctx: &CrawlContext<'_, F>,
    program: &str,
    term: &str,
) -> Result<Vec<CourseRecord>, FetchError> {
    let url = ctx.endpoints.degree_detail(program, term);
    info!("Crawling {} for term {}", program, term);
    let mut records = {
        let doc = ctx.fetcher.fetch(&url)?;
        Extractor::new(ctx.fetcher, ctx.endpoints, ctx.registry, Classifier::default()).extract(&doc)
    };
    info!("{}: {} courses extracted", program, records.len());
    enrich_details(ctx, term, &mut records);
    Ok(records)
}

/// Required and university courses always; core and area electives only for
/// the configured majors.
pub fn is_detail_eligible(record: &CourseRecord, majors: &HashSet<String>) -> bool {
    match record.category {
        Category::Required | Category::University => true,
        Category::Core | Category::Area => majors.contains(&record.identity.major),
        _ => false,
    }
}

/// Attach details to every eligible record. Results are applied in record
/// order whatever order the fetches finish in.
pub fn enrich_details<F: Fetch + Sync>(ctx: &CrawlContext<'_, F>, term: &str, records: &mut [CourseRecord]) {
    let targets: Vec<(usize, CourseIdentity)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| is_detail_eligible(r, ctx.detail_majors))
        .map(|(i, r)| (i, r.identity.clone()))
        .collect();
    if targets.is_empty() {
        return;
    }
    info!("Fetching details for {} courses", targets.len());

    let pb = ProgressBar::new(targets.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let details = fetch_all(ctx, term, &targets, &pb);
    pb.finish_and_clear();

    for ((idx, _), d) in targets.into_iter().zip(details) {
        records[idx].details = Some(d);
    }
}

#[cfg(feature = "rayon")]
fn fetch_all<F: Fetch + Sync>(
    ctx: &CrawlContext<'_, F>,
    term: &str,
    targets: &[(usize, CourseIdentity)],
    pb: &ProgressBar,
) -> Vec<CourseDetails> {
    targets
        .par_iter()
        .map(|(_, course)| {
            let d = fetch_details(ctx.fetcher, ctx.endpoints, term, course);
            pb.inc(1);
            d
        })
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn fetch_all<F: Fetch + Sync>(
    ctx: &CrawlContext<'_, F>,
    term: &str,
    targets: &[(usize, CourseIdentity)],
    pb: &ProgressBar,
) -> Vec<CourseDetails> {
    targets
        .iter()
        .map(|(_, course)| {
            let d = fetch_details(ctx.fetcher, ctx.endpoints, term, course);
            pb.inc(1);
            d
        })
        .collect()
}

/// Two pages per course; a failed fetch only blanks the fields it would fill.
pub fn fetch_details<F: Fetch>(fetcher: &F, endpoints: &Endpoints, term: &str, course: &CourseIdentity) -> CourseDetails {
    let last_offered_term = match fetcher.fetch(&endpoints.last_offered(course)) {
        Ok(doc) => extract_last_offered_term(&doc),
        Err(e) => {
            warn!("Could not fetch last offered term for {}: {}", course, e);
            String::new()
        }
    };

    let (prerequisites, corequisites) = match fetcher.fetch(&endpoints.course_detail(term, course)) {
        Ok(doc) => (
            extract_labeled_text(&doc, PREREQUISITES_LABEL),
            extract_labeled_text(&doc, COREQUISITES_LABEL),
        ),
        Err(e) => {
            warn!("Could not fetch prerequisites/corequisites for {}: {}", course, e);
            (String::new(), String::new())
        }
    };

    CourseDetails {
        prerequisites,
        corequisites,
        last_offered_term,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MapFetcher;

    const TERM: &str = "202402";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("https://suis.sabanciuniv.edu/prod/", "UG", "EN").unwrap()
    }

    fn majors() -> HashSet<String> {
        ["CS", "DSA"].iter().map(|s| s.to_string()).collect()
    }

    fn record(major: &str, code: &str, category: Category) -> CourseRecord {
        CourseRecord {
            identity: CourseIdentity::new(major, code),
            name: String::new(),
            ects: "6".into(),
            engineering: 0,
            basic_science: 0,
            su_credit: "3".into(),
            faculty: String::new(),
            category,
            faculty_course: None,
            details: None,
        }
    }

    #[test]
    fn eligibility() {
        let m = majors();
        assert!(is_detail_eligible(&record("HIST", "191", Category::University), &m));
        assert!(is_detail_eligible(&record("ENS", "491", Category::Required), &m));
        assert!(is_detail_eligible(&record("CS", "300", Category::Core), &m));
        assert!(is_detail_eligible(&record("DSA", "301", Category::Area), &m));
        assert!(!is_detail_eligible(&record("MATH", "306", Category::Core), &m));
        assert!(!is_detail_eligible(&record("CS", "412", Category::Free), &m));
        assert!(!is_detail_eligible(&record("CS", "100", Category::ExtraAttribute), &m));
    }

    #[test]
    fn details_from_both_pages() {
        let e = endpoints();
        let cs300 = CourseIdentity::new("CS", "300");
        let fetcher = MapFetcher::default()
            .with_page(e.last_offered(&cs300), fixture("last_offered"))
            .with_page(e.course_detail(TERM, &cs300), fixture("course_detail"));
        let d = fetch_details(&fetcher, &e, TERM, &cs300);
        assert_eq!(d.last_offered_term, "Spring 2024-2025");
        assert!(d.prerequisites.starts_with("Undergraduate level CS 201"));
        assert_eq!(d.corequisites, "CS 300R");
    }

    #[test]
    fn failed_detail_fetch_leaves_fields_empty() {
        let e = endpoints();
        let cs300 = CourseIdentity::new("CS", "300");
        let fetcher = MapFetcher::default().with_page(e.last_offered(&cs300), fixture("last_offered"));
        let d = fetch_details(&fetcher, &e, TERM, &cs300);
        assert_eq!(d.last_offered_term, "Spring 2024-2025");
        assert_eq!(d.prerequisites, "");
        assert_eq!(d.corequisites, "");
    }

    #[test]
    fn enrichment_keeps_order_and_skips_ineligible() {
        let e = endpoints();
        let registry = FacultyRegistry::builtin();
        let m = majors();
        let cs300 = CourseIdentity::new("CS", "300");
        let fetcher = MapFetcher::default().with_page(e.course_detail(TERM, &cs300), fixture("course_detail"));
        let ctx = CrawlContext {
            fetcher: &fetcher,
            endpoints: &e,
            registry: &registry,
            detail_majors: &m,
        };
        let mut records = vec![
            record("CS", "412", Category::Free),
            record("CS", "300", Category::Core),
            record("HIST", "191", Category::University),
        ];
        enrich_details(&ctx, TERM, &mut records);
        assert!(records[0].details.is_none());
        assert_eq!(records[1].corequisites(), "CS 300R");
        let hist = records[2].details.as_ref().unwrap();
        assert_eq!(hist, &CourseDetails::default());
        // two pages for each of the two eligible courses
        assert_eq!(fetcher.requests.lock().unwrap().len(), 4);
    }

    #[test]
    fn program_crawl_end_to_end() {
        let e = endpoints();
        let registry = FacultyRegistry::builtin();
        let m = majors();
        let fetcher = MapFetcher::default().with_page(e.degree_detail("BSCS", TERM), fixture("degree_detail"));
        let ctx = CrawlContext {
            fetcher: &fetcher,
            endpoints: &e,
            registry: &registry,
            detail_majors: &m,
        };
        let records = crawl_program(&ctx, "BSCS", TERM).unwrap();
        // list pages are missing, so only the zone tables remain
        assert_eq!(records.len(), 8);
        assert!(records
            .iter()
            .all(|r| r.details.is_some() == is_detail_eligible(r, &m)));
    }

    #[test]
    fn program_crawl_needs_degree_page() {
        let e = endpoints();
        let registry = FacultyRegistry::builtin();
        let m = majors();
        let fetcher = MapFetcher::default();
        let ctx = CrawlContext {
            fetcher: &fetcher,
            endpoints: &e,
            registry: &registry,
            detail_majors: &m,
        };
        assert!(crawl_program(&ctx, "BSCS", TERM).is_err());
    }
}
