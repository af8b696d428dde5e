// src/process/region.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::LayoutError;
use crate::grid::{Coord, Direction, Selection, Sheet};

/// Header labels that sheets B onwards repeat from sheet A.
static REPEATED_HEADERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^CIT (All|British|Stateless)").expect("repeated-header regex"));

/// Fixed cell positions of the published "software readable" block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    /// Cell whose text ends with the four-digit year.
    pub year_ref: String,
    /// First cell of the block; its row carries the citizenship headers.
    pub block_start: String,
    /// Last code cell of the block.
    pub block_end: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            year_ref: "A2".into(),
            block_start: "C8".into(),
            block_end: "C26".into(),
        }
    }
}

/// Only the yearly data tabs are converted.
pub fn is_data_sheet(name: &str) -> bool {
    name.starts_with("Data")
}

/// Sheet A carries the full header set; the others repeat part of it.
pub fn is_primary_sheet(name: &str) -> bool {
    name.ends_with('A')
}

/// The located parts of one data sheet.
#[derive(Debug, Clone)]
pub struct Region<'s> {
    pub year: i32,
    /// Column-C cells from `block_start` to `block_end` inclusive.
    pub block: Selection<'s>,
    /// Row labels: non-blank cells of the block below its header row.
    pub codes: Selection<'s>,
    /// Every cell right of a code cell.
    pub observations: Selection<'s>,
    /// Non-blank header cells above the observation columns.
    pub citizenship: Selection<'s>,
}

#[tracing::instrument(level = "debug", skip_all, fields(sheet = sheet.name()))]
pub fn extract_region<'s>(
    sheet: &'s Sheet,
    layout: &SheetLayout,
) -> Result<Region<'s>, LayoutError> {
    let year = sheet_year(sheet, &layout.year_ref)?;

    let start = cell(sheet, &layout.block_start)?;
    let end = cell(sheet, &layout.block_end)?;

    let block = &start.expand(Direction::Down) & &end.expand(Direction::Up);
    let rows = &start.fill(Direction::Down) & &end.expand(Direction::Up);
    let codes = rows.non_blank();

    // a blank code may only head an empty row
    let unlabelled_rows = &rows - &codes;
    if let Some(cell) = first_value(&unlabelled_rows.fill(Direction::Right)) {
        return Err(unresolved(sheet, "Code", cell));
    }
    let observations = codes.fill(Direction::Right);

    let band = start.shift(Direction::Right).fill(Direction::Right);
    let labelled = band.non_blank();

    // a blank header may only sit above an empty column
    let unlabelled_cols = &band - &labelled;
    if let Some(cell) =
        first_value(&(&unlabelled_cols.fill(Direction::Down) & &observations))
    {
        return Err(unresolved(sheet, "IPS Citizenship", cell));
    }

    let mut citizenship = labelled;
    if !is_primary_sheet(sheet.name()) {
        citizenship = &citizenship - &citizenship.regex(&REPEATED_HEADERS);
    }
    if citizenship.is_empty() {
        return Err(LayoutError::NoHeaders {
            sheet: sheet.name().to_string(),
        });
    }

    debug!(
        year,
        codes = codes.len(),
        headers = citizenship.len(),
        "located observation block"
    );

    Ok(Region {
        year,
        block,
        codes,
        observations,
        citizenship,
    })
}

/// First non-blank cell of `cells`, row-major.
fn first_value(cells: &Selection<'_>) -> Option<Coord> {
    cells.non_blank().coords().next()
}

fn unresolved(sheet: &Sheet, axis: &'static str, cell: Coord) -> LayoutError {
    LayoutError::Unresolved {
        sheet: sheet.name().to_string(),
        axis,
        cell: cell.to_string(),
    }
}

fn cell<'s>(sheet: &'s Sheet, reference: &str) -> Result<Selection<'s>, LayoutError> {
    sheet
        .excel_ref(reference)
        .ok_or_else(|| LayoutError::MissingCell {
            sheet: sheet.name().to_string(),
            reference: reference.to_string(),
        })
}

/// Last four characters of the year cell, as an integer.
fn sheet_year(sheet: &Sheet, reference: &str) -> Result<i32, LayoutError> {
    let found = cell(sheet, reference)?
        .cells()
        .next()
        .map(|(_, v)| v.as_text())
        .unwrap_or_default();
    let trimmed = found.trim_end();
    let tail = trimmed
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| &trimmed[i..])
        .unwrap_or("");
    tail.parse::<i32>().map_err(|_| LayoutError::BadYear {
        sheet: sheet.name().to_string(),
        reference: reference.to_string(),
        found: found.clone(),
    })
}
