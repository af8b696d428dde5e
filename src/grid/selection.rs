// src/grid/selection.rs

use std::collections::BTreeSet;
use std::ops::{BitAnd, BitOr, Sub};

use regex::Regex;

use super::{CellValue, Coord, Direction, Sheet};

/// A set of cells in one sheet. Iterates row-major.
#[derive(Debug, Clone)]
pub struct Selection<'s> {
    sheet: &'s Sheet,
    cells: BTreeSet<Coord>,
}

impl<'s> Selection<'s> {
    pub fn from_coords<I: IntoIterator<Item = Coord>>(sheet: &'s Sheet, coords: I) -> Self {
        Self::from_set(sheet, coords.into_iter().collect())
    }

    pub(super) fn from_set(sheet: &'s Sheet, cells: BTreeSet<Coord>) -> Self {
        Self { sheet, cells }
    }

    pub fn sheet(&self) -> &'s Sheet {
        self.sheet
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(&coord)
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().copied()
    }

    /// `(coord, value)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &'s CellValue)> + '_ {
        let sheet = self.sheet;
        self.cells.iter().map(move |&c| (c, sheet.get(c)))
    }

    /// Every cell strictly beyond each selected cell in `dir`, up to the
    /// sheet extent. Blank cells are included.
    pub fn fill(&self, dir: Direction) -> Self {
        let mut out = BTreeSet::new();
        for &seed in &self.cells {
            let mut cur = seed.step(dir);
            while let Some(c) = cur {
                if !self.sheet.contains(c) {
                    break;
                }
                out.insert(c);
                cur = c.step(dir);
            }
        }
        Self::from_set(self.sheet, out)
    }

    /// The selection itself plus its `fill` in `dir`.
    pub fn expand(&self, dir: Direction) -> Self {
        self | &self.fill(dir)
    }

    /// Move every cell one step in `dir`, dropping cells that leave the sheet.
    pub fn shift(&self, dir: Direction) -> Self {
        let cells = self
            .cells
            .iter()
            .filter_map(|c| c.step(dir))
            .filter(|&c| self.sheet.contains(c))
            .collect();
        Self::from_set(self.sheet, cells)
    }

    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(Coord, &CellValue) -> bool,
    {
        let cells = self
            .cells
            .iter()
            .copied()
            .filter(|&c| keep(c, self.sheet.get(c)))
            .collect();
        Self::from_set(self.sheet, cells)
    }

    /// Cells whose text matches `re`; blank cells never match.
    pub fn regex(&self, re: &Regex) -> Self {
        self.filter(|_, v| !v.is_blank() && re.is_match(&v.as_text()))
    }

    pub fn non_blank(&self) -> Self {
        self.filter(|_, v| !v.is_blank())
    }

    pub fn union(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a.union(b).copied().collect())
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a.difference(b).copied().collect())
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a.intersection(b).copied().collect())
    }

    fn combine<F>(&self, other: &Self, op: F) -> Self
    where
        F: FnOnce(&BTreeSet<Coord>, &BTreeSet<Coord>) -> BTreeSet<Coord>,
    {
        debug_assert!(
            std::ptr::eq(self.sheet, other.sheet),
            "selections from different sheets"
        );
        Self::from_set(self.sheet, op(&self.cells, &other.cells))
    }
}

impl PartialEq for Selection<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.sheet, other.sheet) && self.cells == other.cells
    }
}

impl<'s> BitOr for &Selection<'s> {
    type Output = Selection<'s>;
    fn bitor(self, rhs: Self) -> Selection<'s> {
        self.union(rhs)
    }
}

impl<'s> BitAnd for &Selection<'s> {
    type Output = Selection<'s>;
    fn bitand(self, rhs: Self) -> Selection<'s> {
        self.intersection(rhs)
    }
}

impl<'s> Sub for &Selection<'s> {
    type Output = Selection<'s>;
    fn sub(self, rhs: Self) -> Selection<'s> {
        self.difference(rhs)
    }
}
