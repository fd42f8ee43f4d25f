//! Category inference for zones and expand links.
//!
//! Three marker vocabularies are in use on the degree pages: anchor names,
//! `P_AREA` codes on "list courses" links, and bold heading text. Each has its
//! own ordered rule table; they overlap but are not interchangeable, so they are
//! kept apart and exposed as separate pure functions.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Category;

static AREA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"P_AREA=([^&]+)").unwrap());

/// How a rule pattern is tested against an identifier.
#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    Contains(&'static str),
    Suffix(&'static str),
    Exact(&'static str),
}

impl Pattern {
    fn matches(&self, s: &str) -> bool {
        match *self {
            Pattern::Contains(p) => s.contains(p),
            Pattern::Suffix(p) => s.ends_with(p),
            Pattern::Exact(p) => s == p,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub any_of: &'static [Pattern],
    pub category: Category,
}

pub type RuleTable = &'static [Rule];

use Pattern::{Contains, Exact, Suffix};

/// `P_AREA` codes on expand links.
pub const AREA_CODE_RULES: RuleTable = &[
    Rule { any_of: &[Contains("_CEL"), Contains("_COR"), Contains("_CE1"), Contains("_C1")], category: Category::Core },
    Rule { any_of: &[Contains("_CE2"), Contains("_PHL"), Contains("_MEL"), Contains("_C2")], category: Category::ExtraAttribute },
    Rule { any_of: &[Contains("_REQ")], category: Category::Required },
    Rule { any_of: &[Contains("_AEL"), Contains("_ARE")], category: Category::Area },
    Rule { any_of: &[Contains("_FEL"), Contains("_FRE")], category: Category::Free },
    Rule { any_of: &[Contains("UC_")], category: Category::University },
];

/// Anchor `name` attributes. `_PHL` is never recognized here.
pub const ANCHOR_RULES: RuleTable = &[
    Rule { any_of: &[Suffix("_CEL"), Contains("_COR"), Contains("_CE1"), Contains("_C1")], category: Category::Core },
    Rule { any_of: &[Suffix("_CE2"), Suffix("_C2"), Contains("_MEL")], category: Category::ExtraAttribute },
    Rule { any_of: &[Suffix("_REQ")], category: Category::Required },
    Rule { any_of: &[Suffix("_AEL"), Suffix("_ARE")], category: Category::Area },
    Rule { any_of: &[Suffix("_FEL"), Suffix("_FRE")], category: Category::Free },
    Rule { any_of: &[Exact("UC_FENS"), Exact("UC_FASS")], category: Category::University },
];

/// Area codes met by the whole-document sweep, where `_CE2`/`_C2` count as core
/// and `_PHL`/`_MEL` as required.
pub const SWEEP_AREA_RULES: RuleTable = &[
    Rule {
        any_of: &[Contains("_CEL"), Contains("_COR"), Contains("_CE1"), Contains("_CE2"), Contains("_C1"), Contains("_C2")],
        category: Category::Core,
    },
    Rule { any_of: &[Contains("_REQ")], category: Category::Required },
    Rule { any_of: &[Contains("_AEL"), Contains("_ARE")], category: Category::Area },
    Rule { any_of: &[Contains("_FEL"), Contains("_FRE")], category: Category::Free },
    Rule { any_of: &[Contains("UC_")], category: Category::University },
    Rule { any_of: &[Contains("_PHL"), Contains("_MEL")], category: Category::Required },
];

const ZONE_SUFFIXES: &[&str] = &["_CEL", "_REQ", "_AEL", "_ARE"];
const ZONE_PREFIX: &str = "main";

fn first_match(table: RuleTable, s: &str) -> Option<Category> {
    table
        .iter()
        .find(|rule| rule.any_of.iter().any(|p| p.matches(s)))
        .map(|rule| rule.category)
}

/// Rule tables, injected into the extractor instead of being read as globals.
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    pub area_rules: RuleTable,
    pub anchor_rules: RuleTable,
    pub sweep_rules: RuleTable,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            area_rules: AREA_CODE_RULES,
            anchor_rules: ANCHOR_RULES,
            sweep_rules: SWEEP_AREA_RULES,
        }
    }
}

impl Classifier {
    /// Link area code first, then the anchor name, then the heading text.
    pub fn classify(&self, anchor_id: &str, link_target: Option<&str>, heading: Option<&str>) -> Category {
        if let Some(code) = link_target.and_then(area_code) {
            return self.classify_area_code(code);
        }
        if let Some(category) = self.classify_anchor(anchor_id) {
            return category;
        }
        heading.map_or(Category::Unknown, classify_heading)
    }

    pub fn classify_area_code(&self, code: &str) -> Category {
        first_match(self.area_rules, code).unwrap_or(Category::Unknown)
    }

    pub fn classify_anchor(&self, anchor_id: &str) -> Option<Category> {
        first_match(self.anchor_rules, anchor_id)
    }

    pub fn classify_sweep_code(&self, code: &str) -> Category {
        first_match(self.sweep_rules, code).unwrap_or(Category::Unknown)
    }
}

/// Bold heading text above a zone table.
pub fn classify_heading(title: &str) -> Category {
    let t = title.to_lowercase();
    if t.contains("university") && t.contains("courses") {
        Category::University
    } else if t.contains("required") && t.contains("courses") {
        Category::Required
    } else if t.contains("core") && t.contains("elective") {
        Category::Core
    } else if t.contains("area") && t.contains("elective") {
        Category::Area
    } else if t.contains("free") && t.contains("elective") {
        Category::Free
    } else if t == "total" {
        // the university requirements block renders under a "Total" heading
        Category::University
    } else {
        Category::Unknown
    }
}

/// Whether an anchor `name` opens a zone.
pub fn is_zone_anchor(name: &str) -> bool {
    ZONE_SUFFIXES.iter().any(|s| name.ends_with(s)) || name.starts_with(ZONE_PREFIX)
}

/// Value of the `P_AREA` query parameter in a link target.
pub fn area_code(href: &str) -> Option<&str> {
    AREA_RE.captures(href).and_then(|c| c.get(1)).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_area_code(code: &str) -> Category {
        Classifier::default().classify_area_code(code)
    }

    fn classify_anchor(anchor_id: &str) -> Option<Category> {
        Classifier::default().classify_anchor(anchor_id)
    }

    #[test]
    fn area_codes_in_priority_order() {
        assert_eq!(classify_area_code("BSCS_CEL"), Category::Core);
        assert_eq!(classify_area_code("BSCS_COR"), Category::Core);
        assert_eq!(classify_area_code("BSMAT_C1"), Category::Core);
        assert_eq!(classify_area_code("BSCS_CE2"), Category::ExtraAttribute);
        assert_eq!(classify_area_code("BSCS_PHL"), Category::ExtraAttribute);
        assert_eq!(classify_area_code("BSCS_MEL"), Category::ExtraAttribute);
        assert_eq!(classify_area_code("BSCS_REQ"), Category::Required);
        assert_eq!(classify_area_code("BSCS_AEL"), Category::Area);
        assert_eq!(classify_area_code("BSCS_ARE"), Category::Area);
        assert_eq!(classify_area_code("BSCS_FEL"), Category::Free);
        assert_eq!(classify_area_code("UC_FENS"), Category::University);
        assert_eq!(classify_area_code("BSCS_XYZ"), Category::Unknown);
    }

    #[test]
    fn core_wins_over_later_rules() {
        // both a core and a required marker: core is checked first
        assert_eq!(classify_area_code("X_CEL_REQ"), Category::Core);
    }

    #[test]
    fn anchor_rules_differ_from_area_rules() {
        assert_eq!(classify_anchor("BSCS_CEL"), Some(Category::Core));
        assert_eq!(classify_anchor("BSCS_CE2"), Some(Category::ExtraAttribute));
        assert_eq!(classify_anchor("BSCS_REQ"), Some(Category::Required));
        assert_eq!(classify_anchor("BSCS_FRE"), Some(Category::Free));
        assert_eq!(classify_anchor("UC_FENS"), Some(Category::University));
        // suffix vs substring: a mid-string _REQ is not a required anchor
        assert_eq!(classify_anchor("BSCS_REQ_1"), None);
        assert_eq!(classify_area_code("BSCS_REQ_1"), Category::Required);
        // _PHL only exists in the link vocabulary
        assert_eq!(classify_anchor("BSCS_PHL"), None);
        // UC_ prefix alone is not enough for an anchor
        assert_eq!(classify_anchor("UC_SBS"), None);
    }

    #[test]
    fn sweep_rules() {
        let c = Classifier::default();
        assert_eq!(c.classify_sweep_code("BSCS_CE2"), Category::Core);
        assert_eq!(c.classify_sweep_code("BSCS_C2"), Category::Core);
        assert_eq!(c.classify_sweep_code("BSCS_PHL"), Category::Required);
        assert_eq!(c.classify_sweep_code("BSCS_MEL"), Category::Required);
        assert_eq!(c.classify_sweep_code("UC_FASS"), Category::University);
        assert_eq!(c.classify_sweep_code("nothing"), Category::Unknown);
    }

    #[test]
    fn headings() {
        assert_eq!(classify_heading("University Courses"), Category::University);
        assert_eq!(classify_heading("Required Courses"), Category::Required);
        assert_eq!(classify_heading("Core Electives"), Category::Core);
        assert_eq!(classify_heading("Area Electives"), Category::Area);
        assert_eq!(classify_heading("Free Electives"), Category::Free);
        assert_eq!(classify_heading("Total"), Category::University);
        assert_eq!(classify_heading("Total Credits"), Category::Unknown);
        assert_eq!(classify_heading(""), Category::Unknown);
    }

    #[test]
    fn priority_link_then_anchor_then_heading() {
        let c = Classifier::default();
        let link = "SU_DEGREE.p_list_courses?P_AREA=BSCS_FEL&P_PROGRAM=BSCS";
        assert_eq!(c.classify("BSCS_REQ", Some(link), Some("Core Electives")), Category::Free);
        assert_eq!(c.classify("BSCS_REQ", None, Some("Core Electives")), Category::Required);
        assert_eq!(c.classify("main1", None, Some("Core Electives")), Category::Core);
        assert_eq!(c.classify("main1", Some("no_area_here"), None), Category::Unknown);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = Classifier::default();
        let inputs = [
            ("BSCS_CEL", None, None),
            ("main2", Some("x?P_AREA=UC_FENS"), None),
            ("main3", None, Some("Area Electives")),
        ];
        for (anchor, link, heading) in inputs {
            let first = c.classify(anchor, link, heading);
            for _ in 0..3 {
                assert_eq!(c.classify(anchor, link, heading), first);
            }
        }
    }

    #[test]
    fn zone_anchors() {
        assert!(is_zone_anchor("BSCS_CEL"));
        assert!(is_zone_anchor("BSCS_REQ"));
        assert!(is_zone_anchor("BSCS_AEL"));
        assert!(is_zone_anchor("BSCS_ARE"));
        assert!(is_zone_anchor("main_UC"));
        assert!(!is_zone_anchor("BSCS_FEL"));
        assert!(!is_zone_anchor("BSCS_PHL"));
        assert!(!is_zone_anchor("top"));
    }

    #[test]
    fn area_code_from_href() {
        assert_eq!(area_code("SU_DEGREE.p_list_courses?P_AREA=BSCS_FEL&P_LANG=EN"), Some("BSCS_FEL"));
        assert_eq!(area_code("SU_DEGREE.p_list_courses?P_AREA=UC_FENS"), Some("UC_FENS"));
        assert_eq!(area_code("SU_DEGREE.p_list_courses?P_PROGRAM=BSCS"), None);
    }
}
