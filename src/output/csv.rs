// src/output/csv.rs

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::Path;
use tracing::info;

use super::write_atomic;
use crate::process::TidyTable;
use crate::schema::header_row;

/// Write the table with a header row of column titles. Returns rows written.
pub fn write_observations(table: &TidyTable, path: &Path) -> Result<usize> {
    write_atomic(path, |file| {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(header_row())?;
        for record in table.records() {
            wtr.write_record(record.to_row())?;
        }
        wtr.flush()?;
        Ok(())
    })
    .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), rows = table.len(), "wrote observations");
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::TidyRecord;
    use csv::ReaderBuilder;

    fn record(reason: &str, value: Option<f64>) -> TidyRecord {
        TidyRecord {
            year: 2019,
            reason: reason.into(),
            flow: "inflow".into(),
            citizenship: "eu-efta".into(),
            ci: "0.5".into(),
            value,
            marker: None,
            measure_type: "Count".into(),
            unit: "people-thousands".into(),
        }
    }

    #[test]
    fn writes_header_and_rows_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("observations.csv");
        let table = TidyTable::new(vec![
            record("study", Some(12.0)),
            record("other, with comma", None),
        ]);

        assert_eq!(write_observations(&table, &path)?, 2);

        let mut rdr = ReaderBuilder::new().from_path(&path)?;
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        assert_eq!(headers, header_row());

        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "study");
        assert_eq!(&rows[0][5], "12");
        assert_eq!(&rows[1][1], "other, with comma");
        assert_eq!(&rows[1][5], "");
        Ok(())
    }
}
