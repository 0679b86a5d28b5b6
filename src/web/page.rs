//! Page view model handed to rendering.

use serde::Serialize;

use crate::db::{DataSourceRef, DataSources, Record};
use crate::query::QueryOutcome;

/// Read-only view of one request's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageModel {
    /// Selected data source, or "" when nothing is selected.
    #[serde(rename = "selectedSource")]
    pub selected_source: String,

    /// Every allow-listed source, in configured order.
    #[serde(rename = "dataSourceChoices")]
    pub data_sources: Vec<String>,

    /// Query text echoed back into the form.
    pub query: String,

    /// Resolved column labels.
    pub columns: Vec<String>,

    /// One record per row, each `columns.len()` long.
    pub results: Vec<Record>,
}

impl PageModel {
    /// Assembles the page from a finished pipeline run.
    pub fn from_outcome(sources: &DataSources, outcome: QueryOutcome) -> Self {
        Self {
            selected_source: outcome
                .source
                .as_ref()
                .map(DataSourceRef::as_str)
                .unwrap_or_default()
                .to_string(),
            data_sources: sources.names().to_vec(),
            query: outcome.query,
            columns: outcome.result.columns,
            results: outcome.result.rows,
        }
    }

    /// Returns true if the page shows a column header but no rows.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
