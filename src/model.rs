use std::fmt;

use serde::{Serialize, Serializer};

/// Elective classification of a course row (`EL_Type` in the output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    University,
    Required,
    Core,
    Area,
    Free,
    ExtraAttribute,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::University => "university",
            Category::Required => "required",
            Category::Core => "core",
            Category::Area => "area",
            Category::Free => "free",
            Category::ExtraAttribute => "extra_attribute",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CourseIdentity {
    #[serde(rename = "Major")]
    pub major: String,
    #[serde(rename = "Code")]
    pub code: String,
}

impl CourseIdentity {
    pub fn new(major: impl Into<String>, code: impl Into<String>) -> Self {
        CourseIdentity {
            major: major.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for CourseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.major, self.code)
    }
}

/// Free-text fields pulled from the per-course catalogue pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CourseDetails {
    #[serde(rename = "Prerequisites")]
    pub prerequisites: String,
    #[serde(rename = "Corequisites")]
    pub corequisites: String,
    #[serde(rename = "Last_Offered_Term")]
    pub last_offered_term: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRecord {
    #[serde(flatten)]
    pub identity: CourseIdentity,
    #[serde(rename = "Course_Name")]
    pub name: String,
    #[serde(rename = "ECTS")]
    pub ects: String,
    #[serde(rename = "Engineering")]
    pub engineering: u8,
    #[serde(rename = "Basic_Science")]
    pub basic_science: u8,
    #[serde(rename = "SU_credit")]
    pub su_credit: String,
    #[serde(rename = "Faculty")]
    pub faculty: String,
    #[serde(rename = "EL_Type")]
    pub category: Category,
    /// Owning unit when the course is on the faculty list, serialized as "No" otherwise.
    #[serde(rename = "Faculty_Course", serialize_with = "faculty_course_or_no")]
    pub faculty_course: Option<String>,
    #[serde(flatten)]
    pub details: Option<CourseDetails>,
}

impl CourseRecord {
    pub fn prerequisites(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.prerequisites.as_str())
    }

    pub fn corequisites(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.corequisites.as_str())
    }
}

fn faculty_course_or_no<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or("No"))
}

/// A degree program listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub code: String,
    pub title: String,
}
