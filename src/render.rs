//! Enriched-document presentation: standalone HTML or terminal output.

use anyhow::{Context, Result};
use pulldown_cmark::{html, Options, Parser};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::digest::SECTION_SEPARATOR;

pub const STYLESHEET_NAME: &str = "custom.css";

const PAGE_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/page.html"
));
const SEPIA_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/sepia.css"
));

const RULE_WIDTH: usize = 80;

/// Convert an enriched markdown file into a styled sibling `.html` file and
/// return its path.
///
/// The stylesheet is written next to the document on first use only; an
/// existing `custom.css` is never overwritten.
pub fn render_html(markdown_path: &Path) -> Result<PathBuf> {
    let markdown = fs::read_to_string(markdown_path)
        .with_context(|| format!("read {}", markdown_path.display()))?;
    let body = markdown_to_html(&markdown);

    let dir = markdown_path.parent().unwrap_or(Path::new("."));
    ensure_stylesheet(&dir.join(STYLESHEET_NAME))?;

    let page = PAGE_TEMPLATE
        .replace("{stylesheet}", STYLESHEET_NAME)
        .replace("{content}", &body);
    let html_path = markdown_path.with_extension("html");
    fs::write(&html_path, page).with_context(|| format!("write {}", html_path.display()))?;
    Ok(html_path)
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

fn ensure_stylesheet(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, SEPIA_CSS).with_context(|| format!("write {}", path.display()))
}

/// Split the enriched document on its literal separator, trimming each
/// segment. A document with no separator is a single segment.
pub fn split_segments(text: &str) -> Vec<&str> {
    text.split(SECTION_SEPARATOR).map(str::trim).collect()
}

/// Print each segment followed by a rule.
pub fn render_terminal(text: &str, out: &mut impl Write, styled: bool) -> Result<()> {
    let rendered = format_terminal(text, styled);
    out.write_all(rendered.as_bytes())
        .context("write terminal rendering")?;
    Ok(())
}

/// Pure form of the terminal path, kept separate so the segment handling is
/// testable without capturing a stream.
pub fn format_terminal(text: &str, styled: bool) -> String {
    let mut out = String::new();
    for segment in split_segments(text) {
        for line in segment.lines() {
            out.push_str(&style_line(line, styled));
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push_str("\n\n");
    }
    out
}

/// Bold headings and label lines when styling is on.
fn style_line(line: &str, styled: bool) -> String {
    if styled && (line.starts_with('#') || line.starts_with("**")) {
        return format!("\x1b[1m{line}\x1b[0m");
    }
    line.to_string()
}
