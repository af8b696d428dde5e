use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::PathBuf};
use tracing::info;

use crate::process::SheetLayout;

pub const CONFIG_FILE: &str = "ipsmigration.yaml";

pub const LANDING_PAGE: &str = "https://www.ons.gov.uk/peoplepopulationandcommunity/\
populationandmigration/internationalmigration/datasets/ipsmainreasonformigrationbycitizenship";

/// Run settings. Every field has a default, so the config file is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset landing page scraped for the workbook link and description.
    pub landing_page: String,
    /// Read this workbook instead of downloading one.
    pub source_file: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub download_dir: PathBuf,
    /// Root of the component/codelist definitions used by the plain schema.
    pub reference_base_url: String,
    /// Root of published dataset and observation URIs.
    pub data_base_url: String,
    pub base_path: String,
    pub family: String,
    pub theme: String,
    pub publisher: String,
    /// Used when the landing page is not scraped.
    pub title: String,
    pub write_parquet: bool,
    pub layout: SheetLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            landing_page: LANDING_PAGE.to_string(),
            source_file: None,
            out_dir: PathBuf::from("out"),
            download_dir: PathBuf::from("downloads"),
            reference_base_url: "https://gss-cogs.github.io/ref_migration/".into(),
            data_base_url: "http://gss-data.org.uk/data/".into(),
            base_path: "gss_data/migration/ons-ltim-passenger-survey-4-01".into(),
            family: "migration".into(),
            theme: "population".into(),
            publisher: "https://www.gov.uk/government/organisations/office-for-national-statistics"
                .into(),
            title: "International Passenger Survey 4.02, main reason for migration by citizenship"
                .into(),
            write_parquet: true,
            layout: SheetLayout::default(),
        }
    }
}

impl Config {
    /// Load `$IPS_CONFIG` (or `ipsmigration.yaml` if present), then apply
    /// `IPS_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var("IPS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config = Self::from_yaml(&text)
                .with_context(|| format!("parsing config {}", path.display()))?;
            info!(path = %path.display(), "loaded config");
            config
        } else {
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply `IPS_SOURCE_FILE`, `IPS_OUT_DIR` and `IPS_LANDING_PAGE`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(file) = lookup("IPS_SOURCE_FILE").filter(|s| !s.is_empty()) {
            self.source_file = Some(PathBuf::from(file));
        }
        if let Some(dir) = lookup("IPS_OUT_DIR").filter(|s| !s.is_empty()) {
            self.out_dir = PathBuf::from(dir);
        }
        if let Some(page) = lookup("IPS_LANDING_PAGE").filter(|s| !s.is_empty()) {
            self.landing_page = page;
        }
    }

    pub fn dataset_uri(&self) -> String {
        format!("{}{}", self.data_base_url, self.base_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_the_published_dataset() {
        let c = Config::default();
        assert!(c.landing_page.ends_with("/ipsmainreasonformigrationbycitizenship"));
        assert!(!c.landing_page.contains(' '));
        assert_eq!(
            c.dataset_uri(),
            "http://gss-data.org.uk/data/gss_data/migration/ons-ltim-passenger-survey-4-01"
        );
        assert_eq!(c.layout.block_start, "C8");
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> Result<()> {
        let c = Config::from_yaml(
            "out_dir: build/out\nwrite_parquet: false\nlayout:\n  block_end: C30\n",
        )?;
        assert_eq!(c.out_dir, PathBuf::from("build/out"));
        assert!(!c.write_parquet);
        assert_eq!(c.layout.block_end, "C30");
        assert_eq!(c.layout.year_ref, "A2");
        assert_eq!(c.family, "migration");
        assert_eq!(Config::from_yaml("")?, Config::default());
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml("outdir: typo\n").is_err());
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("IPS_SOURCE_FILE", "local.xlsx"),
            ("IPS_OUT_DIR", ""),
            ("IPS_LANDING_PAGE", "http://localhost/page"),
        ]
        .into_iter()
        .collect();
        let mut c = Config::default();
        c.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.source_file, Some(PathBuf::from("local.xlsx")));
        assert_eq!(c.out_dir, PathBuf::from("out"));
        assert_eq!(c.landing_page, "http://localhost/page");
    }
}
