// src/grid/workbook.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Reader, Sheets};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

use super::Sheet;

/// Open a workbook on disk (xls, xlsx, xlsb, ods) and load every worksheet.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<Sheet>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    read_sheets(&mut workbook)
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<Sheet>> {
    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("reading worksheet {:?}", name))?;
        let sheet = Sheet::from_range(name, &range);
        debug!(sheet = sheet.name(), extent = ?sheet.extent(), "loaded worksheet");
        sheets.push(sheet);
    }
    Ok(sheets)
}
