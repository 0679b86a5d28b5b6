//! SQL parsing and projection resolution.
//!
//! Uses sqlparser-rs with the DuckDB dialect to parse SQL, validate that it
//! is a single SELECT, and derive its output column labels.

use sqlparser::ast::{
    ExceptSelectItem, ExcludeSelectItem, Expr, Query, SelectItem, SetExpr, Statement,
    WildcardAdditionalOptions,
};
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::db::{column_names, DataEngine, DataSourceRef};
use crate::error::{DuckieError, Result};

use super::{ParsedStatement, ProjectionItem};

/// Message shared by every "parsed fine, but not allowed" rejection.
const NOT_A_SELECT: &str = "Not a SELECT statement";

/// Statement analyzer that parses SQL and resolves output columns.
#[derive(Debug)]
pub struct StatementAnalyzer {
    dialect: DuckDbDialect,
}

impl Default for StatementAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementAnalyzer {
    /// Creates a new statement analyzer.
    pub fn new() -> Self {
        Self {
            dialect: DuckDbDialect {},
        }
    }

    /// Parses `sql` and returns its projection if it is a single plain SELECT.
    pub fn parse(&self, sql: &str) -> Result<ParsedStatement> {
        let mut statements =
            Parser::parse_sql(&self.dialect, sql).map_err(|e| DuckieError::syntax(e.to_string()))?;

        match statements.len() {
            0 => return Err(DuckieError::syntax("Empty SQL statement")),
            1 => {}
            _ => return Err(DuckieError::validation(NOT_A_SELECT)),
        }

        match statements.remove(0) {
            Statement::Query(query) => parse_query(&query),
            _ => Err(DuckieError::validation(NOT_A_SELECT)),
        }
    }

    /// Resolves the output column labels of `sql`.
    ///
    /// Wildcards are expanded by describing `source` through `engine`; the
    /// engine is not touched when the projection has no wildcard.
    pub async fn analyze(
        &self,
        sql: &str,
        source: Option<&DataSourceRef>,
        engine: &dyn DataEngine,
    ) -> Result<Vec<String>> {
        let statement = self.parse(sql)?;

        let mut columns = Vec::with_capacity(statement.projection.len());
        for item in statement.projection {
            match item {
                ProjectionItem::Column(name) | ProjectionItem::Expression(name) => {
                    columns.push(name)
                }
                ProjectionItem::Wildcard { exclude } => {
                    let source = source.ok_or_else(|| {
                        DuckieError::validation("Select a data source to expand '*'")
                    })?;
                    let descriptors = engine.describe(source).await?;
                    columns.extend(
                        column_names(&descriptors)
                            .into_iter()
                            .filter(|name| !exclude.iter().any(|e| e.eq_ignore_ascii_case(name))),
                    );
                }
            }
        }

        debug!("Resolved {} output columns", columns.len());
        Ok(columns)
    }
}

/// Convenience function to parse SQL without creating an analyzer instance.
pub fn parse_statement(sql: &str) -> Result<ParsedStatement> {
    StatementAnalyzer::new().parse(sql)
}

fn parse_query(query: &Query) -> Result<ParsedStatement> {
    if query.with.is_some() {
        return Err(DuckieError::validation(NOT_A_SELECT));
    }

    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        _ => return Err(DuckieError::validation(NOT_A_SELECT)),
    };

    // SELECT ... INTO creates a table.
    if select.into.is_some() {
        return Err(DuckieError::validation(NOT_A_SELECT));
    }

    let projection = select.projection.iter().map(projection_item).collect();
    Ok(ParsedStatement { projection })
}

fn projection_item(item: &SelectItem) -> ProjectionItem {
    match item {
        SelectItem::UnnamedExpr(expr) => match expr {
            Expr::Identifier(ident) => ProjectionItem::Column(ident.value.clone()),
            Expr::CompoundIdentifier(idents) => match idents.last() {
                Some(ident) => ProjectionItem::Column(ident.value.clone()),
                None => ProjectionItem::Expression(expr.to_string()),
            },
            // Expressions like COUNT(*), CONCAT(name, last_name), etc.
            _ => ProjectionItem::Expression(expr.to_string()),
        },
        SelectItem::ExprWithAlias { alias, .. } => ProjectionItem::Expression(alias.value.clone()),
        SelectItem::Wildcard(options) | SelectItem::QualifiedWildcard(_, options) => {
            ProjectionItem::Wildcard {
                exclude: excluded_columns(options),
            }
        }
    }
}

fn excluded_columns(options: &WildcardAdditionalOptions) -> Vec<String> {
    let mut excluded = Vec::new();

    match &options.opt_exclude {
        Some(ExcludeSelectItem::Single(ident)) => excluded.push(ident.value.clone()),
        Some(ExcludeSelectItem::Multiple(idents)) => {
            excluded.extend(idents.iter().map(|i| i.value.clone()))
        }
        None => {}
    }

    if let Some(ExceptSelectItem {
        first_element,
        additional_elements,
    }) = &options.opt_except
    {
        excluded.push(first_element.value.clone());
        excluded.extend(additional_elements.iter().map(|i| i.value.clone()));
    }

    excluded
}
