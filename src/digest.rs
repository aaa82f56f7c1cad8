//! Intermediate digest formatting and timestamped file naming.

use crate::trending::TrendingRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DIGEST_HEADER: &str = "# Trending GitHub Repositories";

/// Delimits per-repository sections in both the intermediate and the
/// enriched document.
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Serialize the records under the fixed section template. Deterministic
/// for identical input.
pub fn format_digest(records: &[TrendingRecord]) -> String {
    let mut out = String::new();
    out.push_str(DIGEST_HEADER);
    out.push_str("\n\n");
    for record in records {
        out.push_str(&format!("## {}\n", record.canonical_url));
        out.push_str(&format!(
            "**Description:** [README URL]({})\n",
            record.content_url
        ));
        out.push_str(&format!(
            "**Primary Language:** {}\n",
            record.primary_language
        ));
        out.push_str(&format!("**Stars:** {}\n", record.popularity_metric));
        out.push_str("\n---\n\n");
    }
    out
}

pub fn digest_filename(timestamp: u64) -> String {
    format!("trending_repos_{timestamp}.md")
}

pub fn enriched_filename(timestamp: u64) -> String {
    format!("processed_repos_{timestamp}.md")
}

pub fn unix_timestamp() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?;
    Ok(elapsed.as_secs())
}

/// Write the digest for one fetch cycle and return its path. The file is
/// left on disk after the run.
pub fn write_digest(records: &[TrendingRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(digest_filename(unix_timestamp()?));
    fs::write(&path, format_digest(records))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Write the enriched document next to the digest and return its path.
pub fn write_enriched(text: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(enriched_filename(unix_timestamp()?));
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
