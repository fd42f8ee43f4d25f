use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::model::CourseRecord;

/// Keep only records that carry prerequisite or corequisite text.
pub fn retain_detailed(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
    records
        .into_iter()
        .filter(|r| !r.prerequisites().is_empty() || !r.corequisites().is_empty())
        .collect()
}

/// Write `records` as a pretty-printed JSON array to `dir/file`, creating `dir`.
pub fn write_json(dir: &Path, file: &str, records: &[CourseRecord]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file);
    let out = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(out);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(path)
}
