// src/pipeline.rs
//
// One run: obtain the workbook, convert it, write every output file.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::info;

use crate::config::Config;
use crate::dataset::{write_trig, Dataset};
use crate::fetch::{build_client, download_workbook, fetch_dataset_page};
use crate::grid::load_workbook;
use crate::output::{write_observations, write_parquet};
use crate::process::{tidy_workbook, TidyTable};
use crate::schema::{write_schema, write_transform_metadata};

pub const OBSERVATIONS_CSV: &str = "observations.csv";
pub const OBSERVATIONS_SCHEMA: &str = "observations.csv-schema.json";
pub const ALT_CSV: &str = "observations-alt.csv";
pub const ALT_METADATA: &str = "observations-alt.csv-metadata.json";
pub const DATASET_TRIG: &str = "dataset.trig";
pub const OBSERVATIONS_PARQUET: &str = "observations.parquet";

/// Locate the workbook and describe the dataset. A configured local file
/// skips the network entirely.
pub async fn acquire(config: &Config) -> Result<(PathBuf, Dataset)> {
    if let Some(path) = &config.source_file {
        info!(path = %path.display(), "using local workbook");
        return Ok((path.clone(), Dataset::from_config(config, Utc::now())));
    }

    let client = build_client()?;
    let page = fetch_dataset_page(&client, &config.landing_page).await?;
    let url = page
        .latest_workbook()
        .with_context(|| format!("no spreadsheet linked from {}", page.url))?
        .clone();
    let path = download_workbook(&client, &url, &config.download_dir).await?;
    Ok((path, Dataset::from_page(config, &page, Utc::now())))
}

/// Workbook → tidy table.
pub fn convert(path: &Path, config: &Config) -> Result<TidyTable> {
    let sheets = load_workbook(path)?;
    tidy_workbook(&sheets, &config.layout)
        .with_context(|| format!("converting {}", path.display()))
}

/// Write the canonical files, the alt variant and the dataset metadata.
pub fn write_outputs(tidy: &TidyTable, dataset: &Dataset, config: &Config) -> Result<Vec<PathBuf>> {
    let out = &config.out_dir;
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let mut written = Vec::new();

    let csv_path = out.join(OBSERVATIONS_CSV);
    write_observations(tidy, &csv_path)?;
    written.push(csv_path);

    let schema_path = out.join(OBSERVATIONS_SCHEMA);
    write_schema(&schema_path, &config.reference_base_url)?;
    written.push(schema_path);

    let alt = tidy.with_pathified_measure_types();
    let alt_path = out.join(ALT_CSV);
    write_observations(&alt, &alt_path)?;
    written.push(alt_path);

    let meta_path = out.join(ALT_METADATA);
    write_transform_metadata(
        &meta_path,
        ALT_CSV,
        &config.data_base_url,
        &config.base_path,
        dataset.csvw_notes(),
    )?;
    written.push(meta_path);

    let trig_path = out.join(DATASET_TRIG);
    write_trig(dataset, &trig_path)?;
    written.push(trig_path);

    if config.write_parquet {
        let parquet_path = out.join(OBSERVATIONS_PARQUET);
        write_parquet(tidy, &parquet_path)?;
        written.push(parquet_path);
    }

    Ok(written)
}

pub async fn run(config: Config) -> Result<()> {
    let (path, dataset) = acquire(&config).await?;

    let cfg = config.clone();
    let tidy = task::spawn_blocking(move || convert(&path, &cfg))
        .await
        .context("conversion task panicked")??;

    let written = write_outputs(&tidy, &dataset, &config)?;
    info!(
        rows = tidy.len(),
        files = written.len(),
        out_dir = %config.out_dir.display(),
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Sheet;
    use crate::process::fixtures::published_sheet;
    use crate::process::SheetLayout;
    use chrono::TimeZone;

    #[test]
    fn writes_every_output_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config {
            out_dir: dir.path().join("out"),
            ..Config::default()
        };
        let sheets: Vec<Sheet> = vec![
            published_sheet("Data 2019 A", 2019, &["CIT British EST", "CIT British CI"]),
            published_sheet("Notes", 2019, &[]),
        ];
        let tidy = tidy_workbook(&sheets, &SheetLayout::default())?;
        let dataset = Dataset::from_config(
            &config,
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        );

        let written = write_outputs(&tidy, &dataset, &config)?;
        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                OBSERVATIONS_CSV,
                OBSERVATIONS_SCHEMA,
                ALT_CSV,
                ALT_METADATA,
                DATASET_TRIG,
                OBSERVATIONS_PARQUET
            ]
        );
        for p in &written {
            assert!(p.metadata()?.len() > 0, "{} is empty", p.display());
        }

        let canonical = fs::read_to_string(config.out_dir.join(OBSERVATIONS_CSV))?;
        let alt = fs::read_to_string(config.out_dir.join(ALT_CSV))?;
        assert_eq!(canonical.lines().count(), tidy.len() + 1);
        assert!(canonical.contains(",Count,"));
        assert!(alt.contains(",count,"));
        assert!(!alt.contains(",Count,"));
        Ok(())
    }

    #[test]
    fn parquet_is_optional() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config {
            out_dir: dir.path().to_path_buf(),
            write_parquet: false,
            ..Config::default()
        };
        let tidy = TidyTable::new(Vec::new());
        let dataset = Dataset::from_config(&config, Utc::now());
        let written = write_outputs(&tidy, &dataset, &config)?;
        assert_eq!(written.len(), 5);
        assert!(!dir.path().join(OBSERVATIONS_PARQUET).exists());
        Ok(())
    }

    #[tokio::test]
    async fn local_source_skips_the_network() -> Result<()> {
        let config = Config {
            source_file: Some(PathBuf::from("local.xlsx")),
            landing_page: "not a url".into(),
            ..Config::default()
        };
        let (path, dataset) = acquire(&config).await?;
        assert_eq!(path, PathBuf::from("local.xlsx"));
        assert_eq!(dataset.landing_page, "not a url");
        Ok(())
    }
}
