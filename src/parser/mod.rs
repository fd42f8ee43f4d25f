//! Extraction engine for degree curriculum pages.
//!
//! Zones are located and classified (`classify`), each zone's course table is
//! found (`locate`) and turned into records (`rows`), and `merge` runs the three
//! passes that pull in linked course lists. `detail` reads the per-course
//! catalogue pages.

pub mod classify;
pub mod detail;
pub mod dom;
pub mod locate;
pub mod merge;
pub mod rows;
