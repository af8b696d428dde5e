// src/process/aggregate.rs

use anyhow::{bail, Result};
use std::collections::BTreeSet;

use crate::error::CodeError;
use crate::grid::format_number;
use crate::schema::Column;

use super::codes::{citizenship_code, flow_code, pathify, reason_code};
use super::reshape::Observation;

/// One published row.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyRecord {
    pub year: i32,
    pub reason: String,
    pub flow: String,
    pub citizenship: String,
    pub ci: String,
    pub value: Option<f64>,
    pub marker: Option<String>,
    pub measure_type: String,
    pub unit: String,
}

impl TidyRecord {
    /// Normalize the raw labels of one observation into codes.
    pub fn from_observation(obs: Observation) -> Result<Self, CodeError> {
        Ok(Self {
            year: obs.year,
            reason: reason_code(&obs.code)?,
            flow: flow_code(&obs.code)?,
            citizenship: citizenship_code(&obs.citizenship)?,
            ci: obs.ci,
            value: obs.value,
            marker: obs.marker,
            measure_type: obs.measure_type.to_string(),
            unit: obs.unit.to_string(),
        })
    }

    /// Cell text for `column`; blanks are empty strings.
    pub fn field(&self, column: Column) -> String {
        match column {
            Column::Year => self.year.to_string(),
            Column::ReasonForMigration => self.reason.clone(),
            Column::MigrationFlow => self.flow.clone(),
            Column::IpsCitizenship => self.citizenship.clone(),
            Column::Ci => self.ci.clone(),
            Column::Value => self.value.map(format_number).unwrap_or_default(),
            Column::IpsMarker => self.marker.clone().unwrap_or_default(),
            Column::MeasureType => self.measure_type.clone(),
            Column::Unit => self.unit.clone(),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        crate::schema::COLUMNS
            .iter()
            .map(|&c| self.field(c))
            .collect()
    }

    fn category_mut(&mut self, column: Column) -> Option<&mut String> {
        match column {
            Column::ReasonForMigration => Some(&mut self.reason),
            Column::MigrationFlow => Some(&mut self.flow),
            Column::IpsCitizenship => Some(&mut self.citizenship),
            Column::IpsMarker => self.marker.as_mut(),
            Column::MeasureType => Some(&mut self.measure_type),
            Column::Unit => Some(&mut self.unit),
            Column::Year | Column::Ci | Column::Value => None,
        }
    }
}

/// Fixed relabeling of raw codes to published codes.
#[derive(Debug)]
pub struct CategoryMap {
    pairs: &'static [(&'static str, &'static str)],
}

impl CategoryMap {
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    pub fn get(&self, raw: &str) -> Option<&'static str> {
        self.pairs
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
    }

    /// The published code for `raw`; unmapped codes pass through.
    pub fn apply<'a>(&self, raw: &'a str) -> &'a str {
        self.get(raw).unwrap_or(raw)
    }

    /// No target is itself a key, so applying twice equals applying once.
    pub fn is_idempotent(&self) -> bool {
        self.pairs.iter().all(|(_, to)| self.get(to).is_none())
    }
}

pub static REASON_RENAMES: CategoryMap = CategoryMap::new(&[
    ("definite-job", "work-related-definite-job"),
    ("looking-for-work", "work-related-looking-for-work"),
    ("other-reasons", "other"),
    ("work-related-reasons", "work-related-all"),
]);

pub static MARKER_RENAMES: CategoryMap = CategoryMap::new(&[
    ("z", "not-applicable"),
    (".", "no-contact"),
    ("0~", "rounds-to-zero"),
]);

/// Ordered long-format rows with the fixed column schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    records: Vec<TidyRecord>,
}

impl TidyTable {
    pub fn new(records: Vec<TidyRecord>) -> Self {
        Self { records }
    }

    /// Normalize one sheet's observations.
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, CodeError> {
        let records = observations
            .into_iter()
            .map(TidyRecord::from_observation)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    /// Append tables in order. No dedup, no sort.
    pub fn concat<I: IntoIterator<Item = TidyTable>>(tables: I) -> Self {
        let records = tables.into_iter().flat_map(|t| t.records).collect();
        Self { records }
    }

    pub fn records(&self) -> &[TidyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove rows carrying a data marker; returns how many went.
    ///
    /// Provisional: markers are dropped until a published treatment exists
    /// for suppressed and unreliable estimates.
    pub fn drop_marked(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.marker.is_none());
        before - self.records.len()
    }

    /// Relabel a categorical column in place; returns the number of cells changed.
    pub fn rename_categories(&mut self, column: Column, map: &CategoryMap) -> Result<usize> {
        if !column.is_categorical() {
            bail!("column {:?} is not categorical", column.title());
        }
        let mut changed = 0;
        for record in &mut self.records {
            if let Some(value) = record.category_mut(column) {
                if let Some(to) = map.get(value) {
                    *value = to.to_string();
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// The "alt" variant: Measure Type values pathified.
    pub fn with_pathified_measure_types(&self) -> Self {
        let records = self
            .records
            .iter()
            .map(|r| TidyRecord {
                measure_type: pathify(&r.measure_type),
                ..r.clone()
            })
            .collect();
        Self { records }
    }

    /// Distinct non-blank values of `column`, sorted.
    pub fn categories(&self, column: Column) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|r| r.field(column))
            .filter(|v| !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::reshape::{MEASURE_TYPE, UNIT};

    fn obs(year: i32, code: &str, cit: &str, value: Option<f64>, marker: Option<&str>) -> Observation {
        Observation {
            year,
            code: code.into(),
            citizenship: cit.into(),
            ci: "1".into(),
            value,
            marker: marker.map(str::to_string),
            measure_type: MEASURE_TYPE,
            unit: UNIT,
        }
    }

    fn table(year: i32, n: usize) -> TidyTable {
        let rows = (0..n)
            .map(|i| obs(year, "Inflow, Definite job", "CIT British EST", Some(i as f64), None))
            .collect();
        TidyTable::from_observations(rows).unwrap()
    }

    #[test]
    fn normalizes_observation_labels() {
        let rec = TidyRecord::from_observation(obs(
            2020,
            "Inflow, Work related reasons",
            "CIT EU / EFTA EST",
            Some(12.0),
            None,
        ))
        .unwrap();
        assert_eq!(rec.flow, "inflow");
        assert_eq!(rec.reason, "work-related-reasons");
        assert_eq!(rec.citizenship, "eu-efta");
        assert_eq!(
            rec.to_row(),
            vec![
                "2020",
                "work-related-reasons",
                "inflow",
                "eu-efta",
                "1",
                "12",
                "",
                "Count",
                "people-thousands"
            ]
        );
    }

    #[test]
    fn malformed_citizenship_fails_the_sheet() {
        let err = TidyTable::from_observations(vec![obs(2020, "Inflow, Work", "British", None, None)])
            .unwrap_err();
        assert!(matches!(err, CodeError::MissingCitizenshipPrefix { .. }));
    }

    #[test]
    fn concat_preserves_sizes_and_order() {
        let sizes = [3usize, 0, 5, 2];
        let tables: Vec<TidyTable> = sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| table(2000 + i as i32, n))
            .collect();
        let all = TidyTable::concat(tables.clone());
        assert_eq!(all.len(), sizes.iter().sum::<usize>());

        let expected: Vec<TidyRecord> = tables.iter().flat_map(|t| t.records().to_vec()).collect();
        assert_eq!(all.records(), expected.as_slice());
        let years: Vec<i32> = all.records().iter().map(|r| r.year).collect();
        let mut sorted = years.clone();
        sorted.sort();
        assert_eq!(years, sorted);
    }

    #[test]
    fn rename_maps_are_idempotent() {
        assert!(REASON_RENAMES.is_idempotent());
        assert!(MARKER_RENAMES.is_idempotent());

        let mut once = table(2020, 2);
        once.rename_categories(Column::ReasonForMigration, &REASON_RENAMES)
            .unwrap();
        let mut twice = once.clone();
        let changed = twice
            .rename_categories(Column::ReasonForMigration, &REASON_RENAMES)
            .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(once, twice);
        assert_eq!(once.records()[0].reason, "work-related-definite-job");
        assert_eq!(REASON_RENAMES.apply("study"), "study");
    }

    #[test]
    fn renames_only_touch_categorical_columns() {
        let mut t = table(2020, 1);
        assert!(t.rename_categories(Column::Value, &REASON_RENAMES).is_err());
    }

    #[test]
    fn marker_rows_are_dropped() {
        let mut t = TidyTable::from_observations(vec![
            obs(2020, "Inflow, Study", "CIT British EST", Some(1.0), None),
            obs(2020, "Inflow, Study", "CIT EU EST", None, Some("z")),
            obs(2020, "Inflow, Study", "CIT Other EST", None, None),
        ])
        .unwrap();
        assert_eq!(t.drop_marked(), 1);
        assert_eq!(t.len(), 2);
        assert_eq!(t.records()[1].value, None);
    }

    #[test]
    fn marker_renames_apply_to_present_markers() {
        let mut t = TidyTable::from_observations(vec![
            obs(2020, "Inflow, Study", "CIT EU EST", None, Some("0~")),
            obs(2020, "Inflow, Study", "CIT EU EST", Some(2.0), None),
        ])
        .unwrap();
        let changed = t
            .rename_categories(Column::IpsMarker, &MARKER_RENAMES)
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(t.records()[0].marker.as_deref(), Some("rounds-to-zero"));
        assert_eq!(t.records()[1].marker, None);
    }

    #[test]
    fn alt_variant_pathifies_measure_type() {
        let t = table(2020, 2);
        let alt = t.with_pathified_measure_types();
        assert_eq!(alt.len(), 2);
        assert!(alt.records().iter().all(|r| r.measure_type == "count"));
        assert_eq!(t.records()[0].measure_type, "Count");
        assert_eq!(
            alt.categories(Column::MeasureType).into_iter().collect::<Vec<_>>(),
            vec!["count"]
        );
    }
}
