//! Data-source allow-list.
//!
//! The list is fixed at startup. A [`DataSourceRef`] can only be obtained by
//! resolving a name against it, so unlisted names never reach the engine.

use std::fmt;
use std::sync::Arc;

use crate::error::{DuckieError, Result};

/// The process-wide set of queryable sources.
#[derive(Debug, Clone)]
pub struct DataSources {
    names: Arc<[String]>,
}

/// A data source name that passed the allow-list check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRef(String);

impl DataSources {
    /// Creates an allow-list from the given names, keeping their order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique.into(),
        }
    }

    /// Names in display order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Resolves a user-supplied name against the allow-list.
    pub fn resolve(&self, name: &str) -> Result<DataSourceRef> {
        if self.contains(name) {
            Ok(DataSourceRef(name.to_string()))
        } else {
            Err(DuckieError::validation(
                "selected data source does not exist",
            ))
        }
    }

    /// Resolves an optional selection where an empty string means "nothing selected".
    pub fn resolve_selection(&self, name: Option<&str>) -> Result<Option<DataSourceRef>> {
        match name.map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => self.resolve(name).map(Some),
        }
    }
}

impl DataSourceRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for DataSourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
