// src/output/parquet.rs

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::path::Path;
use tracing::info;

use super::write_atomic;
use crate::process::TidyTable;
use crate::schema::{build_arrow_schema, to_record_batch};

/// Columnar copy of the canonical table, Snappy compressed.
pub fn write_parquet(table: &TidyTable, path: &Path) -> Result<()> {
    let batch = to_record_batch(table).context("building record batch")?;
    write_atomic(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, build_arrow_schema(), Some(props))
            .context("creating Arrow writer")?;
        writer.write(&batch).context("writing observations batch")?;
        writer.close().context("closing parquet writer")?;
        Ok(())
    })
    .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}
