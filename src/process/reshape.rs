// src/process/reshape.rs

use std::collections::BTreeMap;

use crate::error::LayoutError;
use crate::grid::{CellValue, Coord, Direction, Selection};

use super::classify::HeaderClasses;
use super::region::Region;

pub const MEASURE_TYPE: &str = "Count";
pub const UNIT: &str = "people-thousands";

/// Where an axis label sits relative to the observation it labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    DirectlyLeft,
    DirectlyAbove,
    DirectlyRight,
}

/// A header selection resolved by adjacency: the nearest axis cell in the
/// same row (left/right) or column (above).
pub struct HeaderAxis {
    name: &'static str,
    lookup: Lookup,
    /// Outer key is the shared row (or column), inner key the position along it.
    lines: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl HeaderAxis {
    pub fn new(name: &'static str, cells: &Selection<'_>, lookup: Lookup) -> Self {
        let mut lines: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
        for (c, v) in cells.cells() {
            let (line, pos) = match lookup {
                Lookup::DirectlyLeft | Lookup::DirectlyRight => (c.row, c.col),
                Lookup::DirectlyAbove => (c.col, c.row),
            };
            lines.entry(line).or_default().insert(pos, v.as_text());
        }
        Self {
            name,
            lookup,
            lines,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(&self, cell: Coord) -> Option<&str> {
        let (line, pos) = match self.lookup {
            Lookup::DirectlyLeft | Lookup::DirectlyRight => (cell.row, cell.col),
            Lookup::DirectlyAbove => (cell.col, cell.row),
        };
        let along = self.lines.get(&line)?;
        let hit = match self.lookup {
            Lookup::DirectlyLeft | Lookup::DirectlyAbove => along.range(..pos).next_back(),
            Lookup::DirectlyRight => along.range(pos + 1..).next(),
        };
        hit.map(|(_, label)| label.as_str())
    }

    fn require(&self, sheet: &str, cell: Coord) -> Result<&str, LayoutError> {
        self.resolve(cell).ok_or_else(|| LayoutError::Unresolved {
            sheet: sheet.to_string(),
            axis: self.name,
            cell: cell.to_string(),
        })
    }
}

/// One estimate cell with its labels, before code normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub year: i32,
    /// Composite `"flow, reason"` row label.
    pub code: String,
    /// Raw column header, e.g. `"CIT British EST"`.
    pub citizenship: String,
    pub ci: String,
    /// OBS: the numeric estimate, blank for markers and empty cells.
    pub value: Option<f64>,
    /// DATAMARKER: non-numeric cell text such as `z` or `0~`.
    pub marker: Option<String>,
    pub measure_type: &'static str,
    pub unit: &'static str,
}

/// Split a cell into (OBS, DATAMARKER).
fn split_value(v: &CellValue) -> (Option<f64>, Option<String>) {
    match v {
        CellValue::Blank => (None, None),
        CellValue::Number(n) => (Some(*n), None),
        CellValue::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                (None, None)
            } else if let Some(n) = t.parse::<f64>().ok().filter(|n| n.is_finite()) {
                (Some(n), None)
            } else {
                (None, Some(t.to_string()))
            }
        }
    }
}

/// Turn one sheet's wide block into observations, row-major.
#[tracing::instrument(level = "debug", skip_all, fields(year = region.year))]
pub fn reshape(
    region: &Region<'_>,
    headers: &HeaderClasses<'_>,
) -> Result<Vec<Observation>, LayoutError> {
    let sheet = region.observations.sheet();
    let observations_est = &region.observations & &headers.estimate.fill(Direction::Down);
    let observations_ci = &region.observations & &headers.ci.fill(Direction::Down);

    let code_axis = HeaderAxis::new("Code", &region.codes, Lookup::DirectlyLeft);
    let citizenship_axis =
        HeaderAxis::new("IPS Citizenship", &headers.estimate, Lookup::DirectlyAbove);
    let ci_axis = HeaderAxis::new("CI", &observations_ci, Lookup::DirectlyRight);

    let mut out = Vec::with_capacity(observations_est.len());
    for (cell, value) in observations_est.cells() {
        let (value, marker) = split_value(value);
        out.push(Observation {
            year: region.year,
            code: code_axis.require(sheet.name(), cell)?.to_string(),
            citizenship: citizenship_axis.require(sheet.name(), cell)?.to_string(),
            ci: ci_axis.require(sheet.name(), cell)?.to_string(),
            value,
            marker,
            measure_type: MEASURE_TYPE,
            unit: UNIT,
        });
    }
    Ok(out)
}
