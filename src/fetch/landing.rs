// src/fetch/landing.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::with_default_retry;

static RELEASE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Release date:\s*(\d{1,2}\s+[A-Za-z]+\s+\d{4})").expect("release-date regex")
});
static SPREADSHEET_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.xlsx?$").expect("spreadsheet-href regex"));

/// What the dataset landing page tells us about the current release.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPage {
    pub url: Url,
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Spreadsheet links in page order, newest edition first on ONS pages.
    pub distributions: Vec<Url>,
}

impl DatasetPage {
    pub fn latest_workbook(&self) -> Option<&Url> {
        self.distributions.first()
    }
}

async fn get_text_core(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

pub async fn get_text_with_retry(client: &Client, url: &Url) -> Result<String> {
    with_default_retry(url, || get_text_core(client, url)).await
}

/// Fetch and scrape the landing page.
#[instrument(level = "info", skip(client))]
pub async fn fetch_dataset_page(client: &Client, landing_page: &str) -> Result<DatasetPage> {
    let url = Url::parse(landing_page).with_context(|| format!("bad landing page {landing_page}"))?;
    let html = get_text_with_retry(client, &url).await?;
    let page = parse_dataset_page(&url, &html)?;
    info!(
        title = page.title.as_deref().unwrap_or(""),
        release = ?page.release_date,
        workbooks = page.distributions.len(),
        "scraped landing page"
    );
    Ok(page)
}

/// Pull title, description, release date and spreadsheet links out of a
/// landing page. Relative links are resolved against `base`.
pub fn parse_dataset_page(base: &Url, html: &str) -> Result<DatasetPage> {
    let doc = Html::parse_document(html);
    let h1 = Selector::parse("h1").expect("h1 selector");
    let title_sel = Selector::parse("title").expect("title selector");
    let meta = Selector::parse(r#"meta[name="description"]"#).expect("meta selector");
    let links = Selector::parse("a[href]").expect("link selector");

    let title = doc
        .select(&h1)
        .chain(doc.select(&title_sel))
        .map(|el| normalise_space(&el.text().collect::<String>()))
        .find(|t| !t.is_empty());

    let description = doc
        .select(&meta)
        .filter_map(|el| el.value().attr("content"))
        .map(normalise_space)
        .find(|d| !d.is_empty());

    let text = normalise_space(&doc.root_element().text().collect::<Vec<_>>().join(" "));
    let release_date = match RELEASE_DATE.captures(&text) {
        Some(caps) => {
            let raw = normalise_space(&caps[1]);
            Some(
                NaiveDate::parse_from_str(&raw, "%d %B %Y")
                    .with_context(|| format!("unparseable release date {raw:?}"))?,
            )
        }
        None => None,
    };

    let mut distributions: Vec<Url> = Vec::new();
    for href in doc.select(&links).filter_map(|el| el.value().attr("href")) {
        if !SPREADSHEET_HREF.is_match(href.trim()) {
            continue;
        }
        if let Ok(full) = base.join(href.trim()) {
            if !distributions.contains(&full) {
                distributions.push(full);
            }
        }
    }

    Ok(DatasetPage {
        url: base.clone(),
        title,
        description,
        release_date,
        distributions,
    })
}

fn normalise_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
