//! Data source schema types for Duckie.
//!
//! Schemas are never cached. Every describe asks the engine with a
//! `DESCRIBE SELECT * FROM <source>` query and decodes the rows here.

use serde::Serialize;

use super::{DataSourceRef, Record, Value};
use crate::error::{DuckieError, Result};

/// Header labels of a DESCRIBE result, in the order the engine emits them.
pub const DESCRIBE_COLUMNS: [&str; 6] = [
    "column_name",
    "column_type",
    "null",
    "key",
    "default",
    "extra",
];

/// One row of schema metadata for a data source.
///
/// Field order matches [`DESCRIBE_COLUMNS`]: name, type, nullability, key,
/// default, extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: String,
    pub nullable: bool,
    pub key: String,
    pub default: String,
    pub extra: String,
}

impl ColumnDescriptor {
    /// Decodes one DESCRIBE row. Engine NULLs in the trailing fields become "".
    pub fn from_record(record: &Record) -> Result<Self> {
        if record.len() != DESCRIBE_COLUMNS.len() {
            return Err(DuckieError::consistency(format!(
                "DESCRIBE row has {} values, expected {}",
                record.len(),
                DESCRIBE_COLUMNS.len()
            )));
        }

        let name = record[0]
            .as_str()
            .ok_or_else(|| {
                DuckieError::consistency(format!(
                    "DESCRIBE column name is not text: {:?}",
                    record[0]
                ))
            })?
            .to_string();

        Ok(Self {
            name,
            column_type: text_or_empty(&record[1]),
            nullable: text_or_empty(&record[2]).eq_ignore_ascii_case("YES"),
            key: text_or_empty(&record[3]),
            default: text_or_empty(&record[4]),
            extra: text_or_empty(&record[5]),
        })
    }
}

fn text_or_empty(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_display_string(),
    }
}

/// The schema-introspection query for a source.
pub fn describe_query(source: &DataSourceRef) -> String {
    format!("DESCRIBE SELECT * FROM {}", source.quoted())
}

/// Decodes a full DESCRIBE result.
pub fn decode_describe(records: &[Record]) -> Result<Vec<ColumnDescriptor>> {
    records.iter().map(ColumnDescriptor::from_record).collect()
}

/// Column names of a described source, in schema order.
pub fn column_names(descriptors: &[ColumnDescriptor]) -> Vec<String> {
    descriptors.iter().map(|d| d.name.clone()).collect()
}
