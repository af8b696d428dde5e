// src/process/mod.rs
//
// Worksheets → tidy table: select data tabs, locate the block, classify
// headers, reshape, normalize codes, aggregate.

pub mod aggregate;
pub mod classify;
pub mod codes;
pub mod region;
pub mod reshape;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::grid::Sheet;
use crate::schema::{Column, COLUMNS};

pub use aggregate::{CategoryMap, TidyRecord, TidyTable, MARKER_RENAMES, REASON_RENAMES};
pub use region::{is_data_sheet, SheetLayout};

/// Convert one data sheet into its tidy sub-table.
#[tracing::instrument(level = "info", skip_all, fields(sheet = sheet.name()))]
pub fn tidy_sheet(sheet: &Sheet, layout: &SheetLayout) -> Result<TidyTable> {
    let region = region::extract_region(sheet, layout)?;
    let headers = classify::classify_headers(&region.citizenship);
    let observations = reshape::reshape(&region, &headers)?;
    let table = TidyTable::from_observations(observations)
        .with_context(|| format!("normalizing codes on sheet {:?}", sheet.name()))?;
    info!(
        year = region.year,
        estimates = headers.estimate.len(),
        intervals = headers.ci.len(),
        rows = table.len(),
        "reshaped"
    );
    Ok(table)
}

/// Convert every data sheet and assemble the published table.
pub fn tidy_workbook(sheets: &[Sheet], layout: &SheetLayout) -> Result<TidyTable> {
    let mut tables = Vec::new();
    for sheet in sheets {
        if !is_data_sheet(sheet.name()) {
            info!(sheet = sheet.name(), "skipping non-data sheet");
            continue;
        }
        tables.push(tidy_sheet(sheet, layout)?);
    }
    info!(sheets = tables.len(), "converted data sheets");

    let mut tidy = TidyTable::concat(tables);

    // TODO: publish marked estimates with an explicit status instead of dropping them
    let dropped = tidy.drop_marked();
    if dropped > 0 {
        warn!(dropped, "dropped rows carrying data markers (provisional)");
    }

    tidy.rename_categories(Column::ReasonForMigration, &REASON_RENAMES)?;
    tidy.rename_categories(Column::IpsMarker, &MARKER_RENAMES)?;

    log_categories(&tidy);
    Ok(tidy)
}

fn log_categories(tidy: &TidyTable) {
    for column in COLUMNS.into_iter().filter(|c| c.is_categorical()) {
        let values = tidy.categories(column);
        info!(
            column = column.title(),
            count = values.len(),
            values = ?values,
            "categories"
        );
    }
}
