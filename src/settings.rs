use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "su_courses";

/// Runtime settings: built-in defaults, then `su_courses.toml`, then `SU_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub level: String,
    pub lang: String,
    pub output_dir: PathBuf,
    /// `PROGRAM=file.json` pairs, comma separated.
    pub programs: String,
    /// Majors whose core/area electives also get detail pages fetched.
    pub detail_majors: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("base_url", "https://suis.sabanciuniv.edu/prod/")?
            .set_default("level", "UG")?
            .set_default("lang", "EN")?
            .set_default("output_dir", "courses")?
            .set_default("programs", "BSCS=CS.json")?
            .set_default("detail_majors", "CS,DSA")?
            .set_default("timeout_secs", 30)?
            .set_default("user_agent", concat!("su_courses/", env!("CARGO_PKG_VERSION")))?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("SU"))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Program code → output file name, in configured order.
    pub fn program_files(&self) -> Vec<(String, String)> {
        parse_program_files(&self.programs)
    }

    pub fn detail_majors(&self) -> HashSet<String> {
        self.detail_majors
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn parse_program_files(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (code, file) = pair.split_once('=')?;
            let (code, file) = (code.trim(), file.trim());
            if code.is_empty() {
                return None;
            }
            let file = if file.is_empty() {
                format!("{}.json", code)
            } else {
                file.to_string()
            };
            Some((code.to_string(), file))
        })
        .collect()
}
