//! Trending-page retrieval and listing extraction.

use anyhow::{anyhow, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// Fixed source of ranked repository listings.
pub const TRENDING_URL: &str = "https://github.com/trending";

const PAGE_ORIGIN: &str = "https://github.com";
const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";
const README_SUFFIX: &str = "/HEAD/README.md";

/// Sentinel used when a listing row carries no language badge.
pub const LANGUAGE_UNSPECIFIED: &str = "unspecified";

/// One discovered repository listing. Built once per fetch cycle from the
/// page markup and immutable afterward.
#[derive(Debug, Clone)]
pub struct TrendingRecord {
    pub canonical_url: String,
    pub content_url: String,
    pub primary_language: String,
    pub popularity_metric: String,
}

/// Retrieve the trending page and extract its listings.
///
/// A transport failure or non-success status aborts the whole pipeline;
/// there is no retry and no partial result.
pub fn fetch_trending() -> Result<Vec<TrendingRecord>> {
    let agent = http_agent();
    let mut response = agent
        .get(TRENDING_URL)
        .call()
        .with_context(|| format!("fetch {TRENDING_URL}"))?;
    let body = response
        .body_mut()
        .read_to_string()
        .context("read trending page body")?;
    let records = parse_trending(&body)?;
    if records.is_empty() {
        tracing::warn!("trending page yielded no listings");
    }
    Ok(records)
}

/// Extract one record per `article.Box-row` listing.
///
/// A row without a usable title link is skipped with a warning rather than
/// aborting the fetch. Optional fields fall back per field: the language
/// badge to [`LANGUAGE_UNSPECIFIED`], the star link to `"0"`.
pub fn parse_trending(html: &str) -> Result<Vec<TrendingRecord>> {
    let row_selector = selector("article.Box-row")?;
    let title_selector = selector("h2 a")?;
    let language_selector = selector("span[itemprop=\"programmingLanguage\"]")?;
    let stars_selector = selector("a[href*=\"/stargazers\"]")?;

    let document = Html::parse_document(html);
    let mut records = Vec::new();
    for row in document.select(&row_selector) {
        let Some(href) = row
            .select(&title_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            tracing::warn!("skipping listing row without a title link");
            continue;
        };
        let canonical_url = format!("{PAGE_ORIGIN}{href}");
        let content_url = readme_url(&canonical_url)?;
        let primary_language = row
            .select(&language_selector)
            .next()
            .map(element_text)
            .unwrap_or_else(|| LANGUAGE_UNSPECIFIED.to_string());
        let popularity_metric = row
            .select(&stars_selector)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "0".to_string());
        records.push(TrendingRecord {
            canonical_url,
            content_url,
            primary_language,
            popularity_metric,
        });
    }
    Ok(records)
}

/// Derive the raw README location from a repository URL: substitute the raw
/// content host and append the default-branch README path.
pub fn readme_url(canonical_url: &str) -> Result<String> {
    let mut url = Url::parse(canonical_url)
        .with_context(|| format!("parse repository url {canonical_url}"))?;
    url.set_host(Some(RAW_CONTENT_HOST))
        .with_context(|| format!("substitute raw host into {canonical_url}"))?;
    Ok(format!("{url}{README_SUFFIX}"))
}

/// Element text with collapsed whitespace; badge and star cells are
/// newline-heavy in the raw markup.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("parse selector `{css}`: {err}"))
}

fn http_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(30)))
        .user_agent(concat!("rdig/", env!("CARGO_PKG_VERSION")))
        .build()
        .new_agent()
}
