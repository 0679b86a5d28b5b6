//! Statement analysis module.
//!
//! Parses SQL, rejects anything that is not a single read-only SELECT, and
//! resolves the ordered list of output column labels, expanding wildcards
//! from the data source's schema.

mod parser;

pub use parser::{parse_statement, StatementAnalyzer};

use std::fmt;

/// One item of a SELECT projection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionItem {
    /// A plain column reference, by bare name.
    Column(String),
    /// Any other expression, labelled by its alias or canonical SQL text.
    Expression(String),
    /// `*` or `t.*`, with the columns named in an EXCLUDE/EXCEPT modifier.
    Wildcard { exclude: Vec<String> },
}

impl ProjectionItem {
    /// Returns true if this item needs the source schema to be resolved.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }
}

impl fmt::Display for ProjectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "{name}"),
            Self::Expression(label) => write!(f, "{label}"),
            Self::Wildcard { exclude } if exclude.is_empty() => write!(f, "*"),
            Self::Wildcard { exclude } => write!(f, "* EXCLUDE ({})", exclude.join(", ")),
        }
    }
}

/// The projection of a validated SELECT statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedStatement {
    pub projection: Vec<ProjectionItem>,
}

impl ParsedStatement {
    /// Returns true if any projection item is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.projection.iter().any(ProjectionItem::is_wildcard)
    }
}
