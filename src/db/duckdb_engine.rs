//! DuckDB engine implementation.
//!
//! Provides the `DuckDbEngine` struct that implements the `DataEngine` trait
//! on top of an embedded, in-memory DuckDB. Data sources are files in the
//! configured data directory, addressed by name in FROM clauses.

use crate::config::EngineConfig;
use crate::db::{check_arity, DataEngine, Record, Value};
use crate::error::{DuckieError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use duckdb::types::{TimeUnit, Value as EngineValue};
use duckdb::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

/// Days from 0001-01-01 (day 1 in chrono's CE numbering) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// DuckDB engine.
///
/// Each call opens its own connection and closes it when the call ends.
/// A semaphore bounds how many connections exist at once.
#[derive(Debug)]
pub struct DuckDbEngine {
    data_dir: PathBuf,
    threads: u32,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
    query_timeout: Duration,
}

impl DuckDbEngine {
    /// Creates an engine from the engine section of the config.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            threads: config.threads.max(1),
            permits: Arc::new(Semaphore::new(config.max_connections.max(1))),
            acquire_timeout: config.acquire_timeout(),
            query_timeout: config.query_timeout(),
        }
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        match tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned())
            .await
        {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(DuckieError::internal("engine connection limiter closed")),
            Err(_) => {
                warn!(
                    "No engine connection available after {:?}",
                    self.acquire_timeout
                );
                Err(DuckieError::engine_busy())
            }
        }
    }
}

#[async_trait]
impl DataEngine for DuckDbEngine {
    async fn execute(&self, sql: &str, column_count: usize) -> Result<Vec<Record>> {
        let permit = self.acquire().await?;
        let start = Instant::now();

        let data_dir = self.data_dir.clone();
        let threads = self.threads;
        let query = sql.to_string();

        // The permit lives inside the blocking task so a query that outlives
        // its request still holds a connection slot until it finishes.
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let conn = open_connection(&data_dir, threads)?;
            run_query(&conn, &query, column_count)
        });

        let records = tokio::time::timeout(self.query_timeout, task)
            .await
            .map_err(|_| {
                DuckieError::engine(format!(
                    "Query timed out after {} seconds",
                    self.query_timeout.as_secs()
                ))
            })?
            .map_err(|e| DuckieError::internal(format!("Engine task failed: {e}")))??;

        debug!(
            "Engine returned {} rows x {} columns in {:?}",
            records.len(),
            column_count,
            start.elapsed()
        );

        Ok(records)
    }
}

/// Opens an in-memory connection that resolves relative file names in `data_dir`.
fn open_connection(data_dir: &Path, threads: u32) -> Result<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| DuckieError::engine(format!("Failed to open engine: {e}")))?;

    let search_path = data_dir.display().to_string().replace('\'', "''");
    conn.execute_batch(&format!(
        "SET threads TO {threads}; SET file_search_path TO '{search_path}';"
    ))
    .map_err(|e| DuckieError::engine(format!("Failed to configure engine: {e}")))?;

    Ok(conn)
}

/// Runs `sql` and scans exactly `column_count` values out of every row.
fn run_query(conn: &Connection, sql: &str, column_count: usize) -> Result<Vec<Record>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DuckieError::engine(e.to_string()))?;
    let mut rows = stmt
        .query([])
        .map_err(|e| DuckieError::engine(e.to_string()))?;

    let engine_columns = rows.as_ref().map(|s| s.column_count()).unwrap_or(0);
    check_arity(column_count, engine_columns)?;

    let mut records = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| DuckieError::engine(e.to_string()))?
    {
        let mut record = Vec::with_capacity(column_count);
        for index in 0..column_count {
            let value: EngineValue = row.get(index).map_err(|e| {
                DuckieError::engine(format!("Failed to read column {index}: {e}"))
            })?;
            record.push(convert_value(value));
        }
        records.push(record);
    }

    Ok(records)
}

/// Converts a DuckDB value into a Duckie value without going through text.
fn convert_value(value: EngineValue) -> Value {
    match value {
        EngineValue::Null => Value::Null,
        EngineValue::Boolean(b) => Value::Bool(b),
        EngineValue::TinyInt(v) => Value::Int(v.into()),
        EngineValue::SmallInt(v) => Value::Int(v.into()),
        EngineValue::Int(v) => Value::Int(v.into()),
        EngineValue::BigInt(v) => Value::Int(v),
        EngineValue::HugeInt(v) => i64::try_from(v)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Decimal(v.to_string())),
        EngineValue::UHugeInt(v) => i64::try_from(v)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Decimal(v.to_string())),
        EngineValue::UTinyInt(v) => Value::Int(v.into()),
        EngineValue::USmallInt(v) => Value::Int(v.into()),
        EngineValue::UInt(v) => Value::Int(v.into()),
        EngineValue::UBigInt(v) => i64::try_from(v)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Decimal(v.to_string())),
        EngineValue::Float(v) => Value::Float(v.into()),
        EngineValue::Double(v) => Value::Float(v),
        EngineValue::Decimal(d) => Value::Decimal(d.to_string()),
        EngineValue::Text(s) => Value::String(s),
        EngineValue::Enum(s) => Value::String(s),
        EngineValue::Blob(b) => Value::Bytes(b),
        EngineValue::Date32(days) => convert_date(days),
        EngineValue::Time64(unit, v) => convert_time(to_micros(unit, v)),
        EngineValue::Timestamp(unit, v) => convert_timestamp(to_micros(unit, v)),
        EngineValue::Interval {
            months,
            days,
            nanos,
        } => Value::String(format!("{months} months {days} days {}us", nanos / 1_000)),
        EngineValue::List(items) | EngineValue::Array(items) => {
            Value::List(items.into_iter().map(convert_value).collect())
        }
        EngineValue::Struct(fields) => Value::Struct(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), convert_value(value.clone())))
                .collect(),
        ),
        EngineValue::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(key, value)| (convert_value(key.clone()), convert_value(value.clone())))
                .collect(),
        ),
        EngineValue::Union(inner) => convert_value(*inner),
        // Remaining engine-specific types (e.g. GEOMETRY) have no native counterpart.
        other => Value::String(format!("{other:?}")),
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn convert_date(days: i32) -> Value {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(Value::Date)
        .unwrap_or_else(|| Value::String(format!("date({days})")))
}

fn convert_time(micros: i64) -> Value {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    u32::try_from(secs)
        .ok()
        .and_then(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos))
        .map(Value::Time)
        .unwrap_or_else(|| Value::String(format!("time({micros}us)")))
}

fn convert_timestamp(micros: i64) -> Value {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
        .map(|dt| Value::Timestamp(dt.naive_utc()))
        .unwrap_or_else(|| Value::String(format!("timestamp({micros}us)")))
}
