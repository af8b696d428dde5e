// src/schema/arrow.rs

use anyhow::Result;
use arrow::array::{ArrayRef, Float64Builder, Int32Builder, StringBuilder};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::columns::{Column, COLUMNS};
use crate::process::TidyTable;

/// Map a tidy column onto an Arrow DataType.
///
/// - Year        → Int32
/// - Value       → Float64
/// - everything else → Utf8
pub fn map_to_arrow_type(column: Column) -> DataType {
    match column {
        Column::Year => DataType::Int32,
        Column::Value => DataType::Float64,
        _ => DataType::Utf8,
    }
}

/// Build an ArrowSchema (inside an Arc) for the tidy table.
pub fn build_arrow_schema() -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = COLUMNS
        .iter()
        .map(|&col| ArrowField::new(col.title(), map_to_arrow_type(col), col.is_optional()))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Columnar copy of the table; blank Value/IPS Marker/CI become nulls.
pub fn to_record_batch(table: &TidyTable) -> Result<RecordBatch> {
    let schema = build_arrow_schema();
    let rows = table.records();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(COLUMNS.len());
    for col in COLUMNS {
        let array: ArrayRef = match col {
            Column::Year => {
                let mut b = Int32Builder::with_capacity(rows.len());
                for r in rows {
                    b.append_value(r.year);
                }
                Arc::new(b.finish())
            }
            Column::Value => {
                let mut b = Float64Builder::with_capacity(rows.len());
                for r in rows {
                    b.append_option(r.value);
                }
                Arc::new(b.finish())
            }
            other => {
                let mut b = StringBuilder::new();
                for r in rows {
                    let text = r.field(other);
                    if text.is_empty() && other.is_optional() {
                        b.append_null();
                    } else {
                        b.append_value(text);
                    }
                }
                Arc::new(b.finish())
            }
        };
        columns.push(array);
    }

    RecordBatch::try_new(schema, columns).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::TidyRecord;
    use arrow::array::{Array, Float64Array, Int32Array, StringArray};

    fn record(value: Option<f64>) -> TidyRecord {
        TidyRecord {
            year: 2019,
            reason: "study".into(),
            flow: "inflow".into(),
            citizenship: "british".into(),
            ci: String::new(),
            value,
            marker: None,
            measure_type: "Count".into(),
            unit: "people-thousands".into(),
        }
    }

    #[test]
    fn schema_follows_column_order() {
        let schema = build_arrow_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names[0], "Year");
        assert_eq!(names[5], "Value");
        assert_eq!(schema.field(0).data_type(), &DataType::Int32);
        assert!(!schema.field(0).is_nullable());
        assert!(schema.field(5).is_nullable());
    }

    #[test]
    fn blanks_become_nulls() -> Result<()> {
        let table = TidyTable::new(vec![record(Some(1.5)), record(None)]);
        let batch = to_record_batch(&table)?;
        assert_eq!(batch.num_rows(), 2);

        let years = batch.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(years.value(1), 2019);

        let values = batch.column(5).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(values.value(0), 1.5);
        assert!(values.is_null(1));

        let ci = batch.column(4).as_any().downcast_ref::<StringArray>().unwrap();
        assert!(ci.is_null(0));
        let flow = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(flow.value(0), "inflow");
        Ok(())
    }
}
