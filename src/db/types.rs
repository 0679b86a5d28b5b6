//! Query result types for Duckie.
//!
//! Defines the structures used to represent query results from the engine.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{DuckieError, Result};

/// Represents the result of executing a SQL query.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QueryResult {
    /// Output column labels, in the order the engine emits values.
    pub columns: Vec<String>,

    /// Rows of data. Every row has exactly `columns.len()` values.
    pub rows: Vec<Record>,
}

impl QueryResult {
    /// Creates a query result, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Record>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DuckieError::consistency(format!(
                "row {} has {} values but {} columns were resolved",
                index,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A row of data from a query result.
pub type Record = Vec<Value>;

/// Represents a single value from the engine.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Exact numeric kept as its decimal text (DECIMAL, HUGEINT, UBIGINT overflow).
    Decimal(String),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// Calendar date.
    Date(NaiveDate),

    /// Time of day.
    Time(NaiveTime),

    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),

    /// LIST / ARRAY value.
    List(Vec<Value>),

    /// STRUCT value, fields in declaration order. Serializes as a JSON object.
    Struct(#[serde(serialize_with = "serialize_fields")] Vec<(String, Value)>),

    /// MAP value as key/value entries. Serializes as `[[key, value], ...]`.
    Map(Vec<(Value, Value)>),
}

fn serialize_fields<S: Serializer>(
    fields: &[(String, Value)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.clone(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            Value::List(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(Value::to_display_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Struct(fields) => format!(
                "{{{}}}",
                fields
                    .iter()
                    .map(|(name, value)| format!("'{}': {}", name, value.to_display_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Value::Map(entries) => format!(
                "{{{}}}",
                entries
                    .iter()
                    .map(|(key, value)| format!(
                        "{}={}",
                        key.to_display_string(),
                        value.to_display_string()
                    ))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

// Conversion implementations for common types
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
