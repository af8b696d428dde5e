// src/grid/sheet.rs

use std::collections::{BTreeMap, BTreeSet};

use calamine::{Data, Range};

use super::{CellValue, Coord, Selection};

/// One worksheet: sparse non-blank cells plus the used extent.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<Coord, CellValue>,
    /// Inclusive bottom-right corner of the used area.
    extent: Option<Coord>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            extent: None,
        }
    }

    /// Build a sheet from A1 references, mostly for fixtures.
    pub fn from_a1<'a, I>(name: impl Into<String>, cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, CellValue)>,
    {
        let mut sheet = Self::new(name);
        for (reference, value) in cells {
            sheet.set(Coord::parse_a1(reference)?, value);
        }
        Some(sheet)
    }

    /// Convert a calamine range, keeping absolute addresses.
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let mut sheet = Self::new(name);
        let (row0, col0) = range.start().unwrap_or((0, 0));
        if let Some((r, c)) = range.end() {
            sheet.extent = Some(Coord::new(r, c));
        }
        for (r, c, data) in range.used_cells() {
            let coord = Coord::new(row0 + r as u32, col0 + c as u32);
            sheet.set(coord, cell_value(data));
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `value` at `coord`, growing the extent. Blank values are not kept.
    pub fn set(&mut self, coord: Coord, value: CellValue) {
        let extent = self.extent.get_or_insert(coord);
        extent.row = extent.row.max(coord.row);
        extent.col = extent.col.max(coord.col);
        if value.is_blank() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, value);
        }
    }

    pub fn get(&self, coord: Coord) -> &CellValue {
        static BLANK: CellValue = CellValue::Blank;
        self.cells.get(&coord).unwrap_or(&BLANK)
    }

    pub fn extent(&self) -> Option<Coord> {
        self.extent
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.extent
            .map(|e| coord.row <= e.row && coord.col <= e.col)
            .unwrap_or(false)
    }

    /// Select a single cell by A1 reference; `None` if it is malformed or
    /// outside the used area.
    pub fn excel_ref(&self, reference: &str) -> Option<Selection<'_>> {
        let coord = Coord::parse_a1(reference)?;
        if !self.contains(coord) {
            return None;
        }
        Some(Selection::from_coords(self, [coord]))
    }

    /// Every non-blank cell.
    pub fn used(&self) -> Selection<'_> {
        Selection::from_set(self, self.cells.keys().copied().collect::<BTreeSet<_>>())
    }
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_range_keeps_absolute_addresses() {
        let mut range: Range<Data> = Range::new((1, 1), (3, 4));
        range.set_value((1, 1), Data::String("Data 2020 A".into()));
        range.set_value((3, 2), Data::Float(4.5));
        range.set_value((2, 4), Data::Int(7));

        let sheet = Sheet::from_range("Data A", &range);
        assert_eq!(sheet.name(), "Data A");
        assert_eq!(sheet.extent(), Some(Coord::new(3, 4)));
        assert_eq!(sheet.get(Coord::new(1, 1)), &CellValue::text("Data 2020 A"));
        assert_eq!(sheet.get(Coord::new(3, 2)), &CellValue::Number(4.5));
        assert_eq!(sheet.get(Coord::new(2, 4)), &CellValue::Number(7.0));
        assert_eq!(sheet.get(Coord::new(0, 0)), &CellValue::Blank);
        assert_eq!(sheet.used().len(), 3);
    }

    #[test]
    fn excel_ref_respects_extent() {
        let sheet = Sheet::from_a1("s", [("B2", CellValue::text("x"))]).unwrap();
        assert!(sheet.excel_ref("B2").is_some());
        assert!(sheet.excel_ref("A1").is_some());
        assert!(sheet.excel_ref("C2").is_none());
        assert!(sheet.excel_ref("not a ref").is_none());
    }
}
