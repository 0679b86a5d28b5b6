//! Storage engine abstraction layer for Duckie.
//!
//! Provides a trait-based interface for engine operations, allowing the
//! DuckDB backend and the in-memory test doubles to be used interchangeably.

mod duckdb_engine;
mod mock;
mod schema;
mod sources;
mod types;

pub use duckdb_engine::DuckDbEngine;
pub use mock::{FailingEngine, MockEngine};
pub use schema::{column_names, describe_query, ColumnDescriptor, DESCRIBE_COLUMNS};
pub use sources::{DataSourceRef, DataSources};
pub use types::{QueryResult, Record, Value};

use crate::error::{DuckieError, Result};
use async_trait::async_trait;

/// Trait defining the interface for storage engines.
///
/// All operations are async and return Results with DuckieError.
#[async_trait]
pub trait DataEngine: Send + Sync {
    /// Executes `sql` unmodified and returns one record per row.
    ///
    /// Every record has exactly `column_count` values. If the engine reports a
    /// different number of columns the call fails with a consistency error.
    async fn execute(&self, sql: &str, column_count: usize) -> Result<Vec<Record>>;

    /// Describes the columns of a data source by asking the engine.
    async fn describe(&self, source: &DataSourceRef) -> Result<Vec<ColumnDescriptor>> {
        let records = self
            .execute(&describe_query(source), DESCRIBE_COLUMNS.len())
            .await?;
        schema::decode_describe(&records)
    }
}

/// Fails unless the engine's result width matches the resolved column count.
pub(crate) fn check_arity(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DuckieError::consistency(format!(
            "resolved {expected} columns but the engine returned {actual}"
        )))
    }
}
