// src/dataset.rs
//
// Dataset-level catalogue metadata, written as TriG and folded into the
// CSVW metadata as notes.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::fetch::DatasetPage;
use crate::output::write_atomic;

const THEME_BASE: &str = "http://gss-data.org.uk/def/concept/statistics-authority-themes/";

const PREFIXES: &[(&str, &str)] = &[
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("dct", "http://purl.org/dc/terms/"),
    ("gdp", "http://gss-data.org.uk/def/gdp#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub uri: String,
    pub title: String,
    pub description: Option<String>,
    pub landing_page: String,
    pub issued: Option<NaiveDate>,
    pub modified: DateTime<Utc>,
    pub publisher: String,
    pub family: String,
    pub theme: String,
}

impl Dataset {
    /// Metadata from config alone, used when reading a local workbook.
    pub fn from_config(config: &Config, modified: DateTime<Utc>) -> Self {
        Self {
            uri: config.dataset_uri(),
            title: config.title.clone(),
            description: None,
            landing_page: config.landing_page.clone(),
            issued: None,
            modified,
            publisher: config.publisher.clone(),
            family: config.family.clone(),
            theme: format!("{}{}", THEME_BASE, config.theme),
        }
    }

    /// Config defaults overlaid with what the landing page says.
    pub fn from_page(config: &Config, page: &DatasetPage, modified: DateTime<Utc>) -> Self {
        let mut ds = Self::from_config(config, modified);
        if let Some(title) = &page.title {
            ds.title = title.trim_start_matches("Dataset:").trim().to_string();
        }
        ds.description = page.description.clone();
        ds.issued = page.release_date;
        ds.landing_page = page.url.to_string();
        ds
    }

    /// Key/value notes for the CSVW metadata document.
    pub fn csvw_notes(&self) -> BTreeMap<String, Value> {
        let mut notes = BTreeMap::new();
        notes.insert("dc:title".into(), json!(self.title));
        if let Some(d) = &self.description {
            notes.insert("dc:description".into(), json!(d));
        }
        if let Some(issued) = self.issued {
            notes.insert("dc:issued".into(), json!(issued.format("%Y-%m-%d").to_string()));
        }
        notes.insert(
            "dc:modified".into(),
            json!(self.modified.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        notes.insert("dc:publisher".into(), json!({ "@id": self.publisher }));
        notes.insert("dcat:landingPage".into(), json!({ "@id": self.landing_page }));
        notes
    }

    /// The catalogue entry as a single named graph.
    pub fn to_trig(&self) -> String {
        Trig(self).to_string()
    }

    fn properties(&self) -> Vec<(&'static str, String)> {
        let mut props = vec![
            ("rdfs:label", lang_literal(&self.title)),
            ("dct:title", lang_literal(&self.title)),
        ];
        if let Some(d) = &self.description {
            props.push(("rdfs:comment", lang_literal(d)));
            props.push(("dct:description", lang_literal(d)));
        }
        if let Some(issued) = self.issued {
            props.push((
                "dct:issued",
                format!("\"{}\"^^xsd:date", issued.format("%Y-%m-%d")),
            ));
        }
        props.push((
            "dct:modified",
            format!(
                "\"{}\"^^xsd:dateTime",
                self.modified.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        ));
        props.push(("dcat:landingPage", format!("<{}>", self.landing_page)));
        props.push(("dct:publisher", format!("<{}>", self.publisher)));
        props.push(("dcat:theme", format!("<{}>", self.theme)));
        props.push(("gdp:family", format!("gdp:{}", self.family)));
        props
    }
}

/// TriG rendering of a [`Dataset`].
struct Trig<'a>(&'a Dataset);

impl fmt::Display for Trig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ds = self.0;
        for (prefix, ns) in PREFIXES {
            writeln!(f, "@prefix {}: <{}> .", prefix, ns)?;
        }
        writeln!(f)?;

        writeln!(f, "<{}/metadata> {{", ds.uri)?;
        writeln!(f, "    <{}> a dcat:Dataset ;", ds.uri)?;
        let props = ds.properties();
        let last = props.len() - 1;
        for (i, (p, o)) in props.iter().enumerate() {
            let end = if i == last { "." } else { ";" };
            writeln!(f, "        {} {} {}", p, o, end)?;
        }
        writeln!(f, "}}")
    }
}

fn lang_literal(s: &str) -> String {
    format!("\"{}\"@en", escape_literal(s))
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

pub fn write_trig(dataset: &Dataset, path: &Path) -> Result<()> {
    let trig = dataset.to_trig();
    write_atomic(path, |f| {
        f.write_all(trig.as_bytes())?;
        Ok(())
    })
    .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote dataset metadata");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use url::Url;

    fn modified() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 15, 9, 30, 0).unwrap()
    }

    fn scraped() -> Dataset {
        let page = DatasetPage {
            url: Url::parse("https://www.ons.gov.uk/datasets/ips").unwrap(),
            title: Some("Dataset: IPS main reason for migration by citizenship".into()),
            description: Some("Estimates of \"long-term\" migration".into()),
            release_date: NaiveDate::from_ymd_opt(2019, 11, 28),
            distributions: vec![],
        };
        Dataset::from_page(&Config::default(), &page, modified())
    }

    #[test]
    fn page_overrides_config_defaults() {
        let ds = scraped();
        assert_eq!(ds.title, "IPS main reason for migration by citizenship");
        assert_eq!(ds.landing_page, "https://www.ons.gov.uk/datasets/ips");
        assert_eq!(
            ds.theme,
            "http://gss-data.org.uk/def/concept/statistics-authority-themes/population"
        );

        let plain = Dataset::from_config(&Config::default(), modified());
        assert_eq!(plain.description, None);
        assert!(plain.title.starts_with("International Passenger Survey 4.02"));
    }

    #[test]
    fn trig_has_named_graph_and_escaped_literals() {
        let trig = scraped().to_trig();
        assert!(trig.starts_with("@prefix dcat: <http://www.w3.org/ns/dcat#> ."));
        assert!(trig.contains(
            "<http://gss-data.org.uk/data/gss_data/migration/ons-ltim-passenger-survey-4-01/metadata> {"
        ));
        assert!(trig.contains("a dcat:Dataset ;"));
        assert!(trig.contains(r#"dct:description "Estimates of \"long-term\" migration"@en ;"#));
        assert!(trig.contains(r#"dct:issued "2019-11-28"^^xsd:date ;"#));
        assert!(trig.contains(r#"dct:modified "2020-01-15T09:30:00Z"^^xsd:dateTime ;"#));
        assert!(trig.contains("gdp:family gdp:migration ."));
        assert!(trig.trim_end().ends_with('}'));
    }

    #[test]
    fn notes_skip_missing_fields() {
        let notes = Dataset::from_config(&Config::default(), modified()).csvw_notes();
        assert!(!notes.contains_key("dc:description"));
        assert!(!notes.contains_key("dc:issued"));
        assert_eq!(notes["dc:modified"], json!("2020-01-15T09:30:00Z"));
        assert_eq!(
            notes["dcat:landingPage"]["@id"],
            json!(Config::default().landing_page)
        );
    }

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_literal("a\\b\n\"c\""), r#"a\\b\n\"c\""#);
    }

    #[test]
    fn writes_trig_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dataset.trig");
        write_trig(&scraped(), &path)?;
        assert_eq!(std::fs::read_to_string(&path)?, scraped().to_trig());
        Ok(())
    }

    #[test]
    fn trig_statements_terminate_once() {
        let trig = Dataset::from_config(&Config::default(), modified()).to_trig();
        let lines: Vec<&str> = trig.lines().collect();
        assert_eq!(lines.iter().filter(|l| l.starts_with("@prefix")).count(), PREFIXES.len());
        let body: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| l.starts_with("        "))
            .collect();
        let (last, rest) = body.split_last().unwrap();
        assert!(rest.iter().all(|l| l.ends_with(" ;")));
        assert_eq!(*last, "        gdp:family gdp:migration .");
        assert_eq!(lines.last(), Some(&"}"));
        assert!(!trig.contains("rdfs:comment"));
    }
}
