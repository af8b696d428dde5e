// src/schema/csvw.rs
//
// CSV on the Web descriptions of the observation files.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use super::columns::{Column, Component, COLUMNS};
use crate::output::write_atomic;

const CSVW_CONTEXT: &str = "http://www.w3.org/ns/csvw";
const REF_PERIOD: &str = "http://purl.org/linked-data/sdmx/2009/dimension#refPeriod";
const YEAR_URI: &str = "http://reference.data.gov.uk/id/year/{year}";
const MEASURE_TYPE: &str = "http://purl.org/linked-data/cube#measureType";
const UNIT_MEASURE: &str = "http://purl.org/linked-data/sdmx/2009/attribute#unitMeasure";

/// A single column definition.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CsvwColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(rename = "propertyUrl", skip_serializing_if = "Option::is_none")]
    pub property_url: Option<String>,
    #[serde(rename = "valueUrl", skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    #[serde(rename = "virtual", skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct TableSchema {
    pub columns: Vec<CsvwColumn>,
    #[serde(rename = "primaryKey", skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(rename = "aboutUrl", skip_serializing_if = "Option::is_none")]
    pub about_url: Option<String>,
}

/// Standalone schema document (`<csv>-schema.json`).
#[derive(Debug, Serialize)]
pub struct SchemaDocument {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(flatten)]
    pub schema: TableSchema,
}

/// Table metadata document (`<csv>-metadata.json`).
#[derive(Debug, Serialize)]
pub struct MetadataDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    pub url: String,
    #[serde(rename = "tableSchema")]
    pub table_schema: TableSchema,
    /// Dataset description, e.g. `dc:title`.
    #[serde(flatten)]
    pub notes: BTreeMap<String, Value>,
}

/// Column definition with component URLs rooted at `base`.
pub fn column_definition(col: Column, base: &str) -> CsvwColumn {
    let slug = col.slug();
    let name = col.name();
    let (property_url, value_url) = match (col, col.component()) {
        (Column::Year, _) => (REF_PERIOD.to_string(), Some(YEAR_URI.to_string())),
        (_, Component::Dimension) => (
            format!("{}def/dimension/{}", base, slug),
            Some(format!("{}def/concept/{}/{{{}}}", base, slug, name)),
        ),
        (Column::IpsMarker, _) => (
            format!("{}def/attribute/{}", base, slug),
            Some(format!("{}def/concept/{}/{{{}}}", base, slug, name)),
        ),
        (_, Component::Attribute) => (format!("{}def/attribute/{}", base, slug), None),
        (_, Component::Measure) => (
            format!("{}def/measure/{{{}}}", base, Column::MeasureType.name()),
            None,
        ),
        (_, Component::MeasureType) => (
            MEASURE_TYPE.to_string(),
            Some(format!("{}def/measure/{{{}}}", base, name)),
        ),
        (_, Component::Unit) => (
            UNIT_MEASURE.to_string(),
            Some(format!("{}def/concept/measurement-units/{{{}}}", base, name)),
        ),
    };

    CsvwColumn {
        name: name.to_string(),
        titles: Some(col.title().to_string()),
        datatype: Some(col.datatype().to_string()),
        required: !col.is_optional(),
        property_url: Some(property_url),
        value_url,
        is_virtual: false,
    }
}

/// Table schema describing the canonical observations file.
pub fn table_schema(base: &str) -> TableSchema {
    TableSchema {
        columns: COLUMNS.iter().map(|&c| column_definition(c, base)).collect(),
        primary_key: Vec::new(),
        about_url: None,
    }
}

/// Transform-oriented schema: every row becomes a `qb:Observation` with a
/// URI built from its dimensions.
pub fn transform_schema(base_url: &str, base_path: &str) -> TableSchema {
    let dataset = format!("{}{}", base_url, base_path);
    let mut columns: Vec<CsvwColumn> = COLUMNS
        .iter()
        .map(|&c| column_definition(c, base_url))
        .collect();
    columns.push(CsvwColumn {
        name: "qb_type".into(),
        titles: None,
        datatype: None,
        required: false,
        property_url: Some("rdf:type".into()),
        value_url: Some("qb:Observation".into()),
        is_virtual: true,
    });
    columns.push(CsvwColumn {
        name: "qb_dataset".into(),
        titles: None,
        datatype: None,
        required: false,
        property_url: Some("qb:dataSet".into()),
        value_url: Some(dataset.clone()),
        is_virtual: true,
    });

    let key_columns: Vec<Column> = COLUMNS
        .iter()
        .copied()
        .filter(|c| matches!(c.component(), Component::Dimension | Component::MeasureType))
        .collect();
    let about = key_columns
        .iter()
        .map(|c| format!("{{{}}}", c.name()))
        .collect::<Vec<_>>()
        .join("/");

    TableSchema {
        columns,
        primary_key: key_columns.iter().map(|c| c.name().to_string()).collect(),
        about_url: Some(format!("{}/{}", dataset, about)),
    }
}

/// Write `<csv>-schema.json` for the canonical file.
pub fn write_schema(path: &Path, reference_base_url: &str) -> Result<()> {
    let doc = SchemaDocument {
        context: CSVW_CONTEXT,
        schema: table_schema(reference_base_url),
    };
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, &doc).context("serializing CSVW schema")?;
        w.write_all(b"\n")?;
        Ok(())
    })
    .with_context(|| format!("writing {}", path.display()))
}

/// Write `<csv>-metadata.json` with the transform schema and dataset notes.
pub fn write_transform_metadata(
    path: &Path,
    csv_name: &str,
    base_url: &str,
    base_path: &str,
    notes: BTreeMap<String, Value>,
) -> Result<()> {
    let doc = MetadataDocument {
        context: serde_json::json!([CSVW_CONTEXT, { "@language": "en" }]),
        url: csv_name.to_string(),
        table_schema: transform_schema(base_url, base_path),
        notes,
    };
    write_atomic(path, |w| {
        serde_json::to_writer_pretty(&mut *w, &doc).context("serializing CSVW metadata")?;
        w.write_all(b"\n")?;
        Ok(())
    })
    .with_context(|| format!("writing {}", path.display()))
}
