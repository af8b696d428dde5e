// src/grid/mod.rs
//
// Sparse worksheet model: cells addressed by zero-based (row, col), with
// selections grown directionally and combined with set algebra.

pub mod selection;
pub mod sheet;
pub mod workbook;

pub use selection::Selection;
pub use sheet::Sheet;
pub use workbook::load_workbook;

use std::fmt;

/// Zero-based cell address, ordered row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub row: u32,
    pub col: u32,
}

impl Coord {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an A1-style reference such as `C8` or `AB12`.
    pub fn parse_a1(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col.checked_mul(26)?.checked_add(digit)?;
        }
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self::new(row - 1, col - 1))
    }

    /// One step in `dir`, or `None` when that would leave the sheet origin.
    pub fn step(self, dir: Direction) -> Option<Self> {
        match dir {
            Direction::Up => self.row.checked_sub(1).map(|row| Self::new(row, self.col)),
            Direction::Down => self.row.checked_add(1).map(|row| Self::new(row, self.col)),
            Direction::Left => self.col.checked_sub(1).map(|col| Self::new(self.row, col)),
            Direction::Right => self.col.checked_add(1).map(|col| Self::new(self.row, col)),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = self.col + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        let col: String = letters.into_iter().rev().collect();
        write!(f, "{}{}", col, self.row + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A single cell value as seen by the reshaping code.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Blank cells and whitespace-only text both count as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Display form: integral numbers print without a fractional part.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
