use std::collections::HashMap;

use crate::model::CourseIdentity;

/// Courses that belong to a faculty regardless of their elective category.
const FACULTY_COURSES: &[(&str, &[&str])] = &[
    (
        "FENS",
        &[
            "CS201", "CS204", "DSA210", "EE200", "EE202", "ENS201", "ENS202", "ENS203",
            "ENS204", "ENS205", "ENS206", "ENS207", "ENS208", "ENS209", "ENS210", "ENS211",
            "ENS214", "ENS216", "MAT204", "MATH201", "MATH202", "MATH203", "MATH204",
            "NS201", "NS207", "NS213", "NS214", "NS216", "NS218", "PHYS211",
        ],
    ),
    (
        "FASS",
        &[
            "ANTH255", "ANTH326", "CULT368", "GEN341", "LIT212", "LIT359", "PHIL202",
            "PHIL321", "VA315", "ECON201", "ECON202", "ECON204", "HART292", "HART311",
            "HIST205", "HIST349", "PSY201", "PSY310", "PSY340", "IR201", "IR301",
            "IR391", "IR394", "POLS250", "POLS301", "SOC201", "SOC301", "HART213",
            "HART293", "VA201", "VA203", "VA312",
        ],
    ),
    (
        "SBS",
        &["ACC201", "FIN301", "MGMT402", "MKTG301", "OPIM302", "ORG301", "ORG302"],
    ),
];

/// Read-only course → owning faculty lookup, built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct FacultyRegistry {
    courses: HashMap<CourseIdentity, String>,
}

impl FacultyRegistry {
    pub fn builtin() -> Self {
        let entries = FACULTY_COURSES.iter().flat_map(|(faculty, courses)| {
            courses
                .iter()
                .filter_map(move |c| split_course_key(c).map(|id| (id, faculty.to_string())))
        });
        Self::from_entries(entries)
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (CourseIdentity, String)>,
    {
        FacultyRegistry {
            courses: entries.into_iter().collect(),
        }
    }

    pub fn faculty_of(&self, id: &CourseIdentity) -> Option<&str> {
        self.courses.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }
}

/// "MATH201" → ("MATH", "201"). Keys without a digit are rejected.
fn split_course_key(key: &str) -> Option<CourseIdentity> {
    let idx = key.find(|c: char| c.is_ascii_digit())?;
    if idx == 0 {
        return None;
    }
    Some(CourseIdentity::new(&key[..idx], &key[idx..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let reg = FacultyRegistry::builtin();
        assert_eq!(reg.faculty_of(&CourseIdentity::new("CS", "201")), Some("FENS"));
        assert_eq!(reg.faculty_of(&CourseIdentity::new("PSY", "201")), Some("FASS"));
        assert_eq!(reg.faculty_of(&CourseIdentity::new("ORG", "302")), Some("SBS"));
        assert_eq!(reg.faculty_of(&CourseIdentity::new("CS", "300")), None);
        assert_eq!(reg.len(), 30 + 32 + 7);
    }

    #[test]
    fn split_keys() {
        assert_eq!(split_course_key("MATH201"), Some(CourseIdentity::new("MATH", "201")));
        assert_eq!(split_course_key("VA315"), Some(CourseIdentity::new("VA", "315")));
        assert_eq!(split_course_key("201"), None);
        assert_eq!(split_course_key("CS"), None);
    }
}
