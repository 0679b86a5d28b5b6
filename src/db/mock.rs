//! Mock engines for testing.
//!
//! Provides an in-memory engine with canned schemas and results, plus an
//! engine that always fails.

use super::{check_arity, describe_query, DataEngine, DataSources, Record, Value};
use crate::error::{DuckieError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A mock engine that answers DESCRIBE for registered tables and returns
/// canned results for registered SQL texts.
#[derive(Debug, Default)]
pub struct MockEngine {
    results: HashMap<String, Vec<Record>>,
    widths: HashMap<String, usize>,
    calls: AtomicUsize,
}

impl MockEngine {
    /// Creates a new mock engine with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table so that describing it returns the given `(name, type)` columns.
    pub fn with_table(mut self, source: &str, columns: &[(&str, &str)]) -> Self {
        let source = DataSources::new([source])
            .resolve(source)
            .expect("source was just added to the allow-list");
        let rows = columns
            .iter()
            .map(|(name, ty)| {
                vec![
                    Value::from(*name),
                    Value::from(*ty),
                    Value::from("YES"),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                ]
            })
            .collect();
        self.with_result(&describe_query(&source), 6, rows)
    }

    /// Registers the result of an exact SQL text, with the width the engine reports.
    pub fn with_result(mut self, sql: &str, width: usize, rows: Vec<Record>) -> Self {
        self.results.insert(sql.to_string(), rows);
        self.widths.insert(sql.to_string(), width);
        self
    }

    /// Number of `execute` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataEngine for MockEngine {
    async fn execute(&self, sql: &str, column_count: usize) -> Result<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let rows = self.results.get(sql).ok_or_else(|| {
            DuckieError::engine(format!("Catalog Error: no mock result for: {sql}"))
        })?;
        check_arity(column_count, self.widths[sql])?;
        Ok(rows.clone())
    }
}

/// An engine whose every call fails as if it could not be opened.
#[derive(Debug, Default)]
pub struct FailingEngine;

#[async_trait]
impl DataEngine for FailingEngine {
    async fn execute(&self, _sql: &str, _column_count: usize) -> Result<Vec<Record>> {
        Err(DuckieError::engine("Failed to open engine: mock failure"))
    }
}
