//! Per-request query pipeline.
//!
//! Runs allow-list check, statement analysis, and execution in sequence,
//! stopping at the first failure.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::analyzer::StatementAnalyzer;
use crate::db::{
    describe_query, DataEngine, DataSourceRef, DataSources, QueryResult, DESCRIBE_COLUMNS,
};
use crate::error::Result;

/// Query text shown when no data source is selected yet.
pub const CHOOSE_SOURCE_PROMPT: &str = "Please choose data source from above.";

/// Everything a finished pipeline run hands to presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// The selected data source, if any.
    pub source: Option<DataSourceRef>,
    /// Query text to echo back to the user.
    pub query: String,
    /// Resolved columns and rows.
    pub result: QueryResult,
}

/// Runs describe and query requests against an engine.
pub struct QueryService {
    engine: Arc<dyn DataEngine>,
    sources: DataSources,
    analyzer: StatementAnalyzer,
}

impl QueryService {
    /// Creates a new query service.
    pub fn new(engine: Arc<dyn DataEngine>, sources: DataSources) -> Self {
        Self {
            engine,
            sources,
            analyzer: StatementAnalyzer::new(),
        }
    }

    /// The allow-list this service checks selections against.
    pub fn sources(&self) -> &DataSources {
        &self.sources
    }

    /// Describes the selected source, or returns an empty prompt page if none is selected.
    pub async fn describe(&self, datasource: Option<&str>) -> Result<QueryOutcome> {
        let source = self.resolve_source(datasource)?;
        let columns = DESCRIBE_COLUMNS.iter().map(|c| c.to_string()).collect();

        let Some(source) = source else {
            return Ok(QueryOutcome {
                source: None,
                query: CHOOSE_SOURCE_PROMPT.to_string(),
                result: QueryResult::new(columns, Vec::new())?,
            });
        };

        let query = describe_query(&source);
        let rows = self
            .engine
            .execute(&query, DESCRIBE_COLUMNS.len())
            .await
            .inspect_err(|e| warn!("Describe of {} failed: {}", source, e))?;
        info!("Described {}: {} columns", source, rows.len());

        Ok(QueryOutcome {
            source: Some(source),
            query,
            result: QueryResult::new(columns, rows)?,
        })
    }

    /// Validates, resolves, and runs a user query against the selected source.
    pub async fn run(&self, datasource: Option<&str>, sql: &str) -> Result<QueryOutcome> {
        let start = Instant::now();
        let source = self.resolve_source(datasource)?;

        let result = self
            .resolve_and_execute(sql, source.as_ref())
            .await
            .inspect_err(|e| warn!("Query failed ({}): {}", e.category(), e))?;

        info!(
            "Query on {} returned {} rows x {} columns in {:?}",
            source.as_ref().map(DataSourceRef::as_str).unwrap_or("<none>"),
            result.row_count(),
            result.columns.len(),
            start.elapsed()
        );

        Ok(QueryOutcome {
            source,
            query: sql.to_string(),
            result,
        })
    }

    fn resolve_source(&self, datasource: Option<&str>) -> Result<Option<DataSourceRef>> {
        self.sources
            .resolve_selection(datasource)
            .inspect_err(|e| {
                warn!(
                    "Rejected data source {:?}: {}",
                    datasource.unwrap_or_default(),
                    e
                )
            })
    }

    async fn resolve_and_execute(
        &self,
        sql: &str,
        source: Option<&DataSourceRef>,
    ) -> Result<QueryResult> {
        let columns = self.analyzer.analyze(sql, source, self.engine.as_ref()).await?;
        let rows = self.engine.execute(sql, columns.len()).await?;
        QueryResult::new(columns, rows)
    }
}
