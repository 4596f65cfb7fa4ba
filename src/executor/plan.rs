//! Binding a parsed statement to the catalog.

use std::sync::Arc;

use tracing::debug;

use super::error::QueryError;
use super::predicate::CompiledPredicate;
use crate::catalog::{Catalog, TableDef};
use crate::sql::{Projection, SelectStmt};

/// A projected output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    /// Name reported to callers.
    pub name: String,
    /// Index into the table's columns.
    pub index: usize,
}

/// A compiled query: everything needed to stream its results.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Table to scan.
    pub table: Arc<TableDef>,
    /// Output columns in order.
    pub columns: Vec<OutputColumn>,
    /// Optional filter.
    pub predicate: Option<CompiledPredicate>,
}

impl QueryPlan {
    /// Returns the output column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Resolves the statement's table and columns and type-checks its filter.
///
/// `*` expands to every column in catalog order under its catalog name;
/// explicitly listed columns keep the spelling used in the query.
///
/// # Errors
///
/// Returns `UnknownTable` or `UnknownColumn` for names missing from the
/// catalog, and `TypeMismatch`, `InvalidDate`, `UnsupportedType` or
/// `UnsupportedOperator` for a filter that cannot apply to its column.
pub fn compile(stmt: &SelectStmt, catalog: &Catalog) -> Result<QueryPlan, QueryError> {
    let table = catalog
        .resolve_table(&stmt.table.value)
        .ok_or_else(|| QueryError::UnknownTable(stmt.table.value.clone()))?
        .clone();

    let columns = match &stmt.projection {
        Projection::Wildcard => table
            .columns
            .iter()
            .enumerate()
            .map(|(index, c)| OutputColumn {
                name: c.name.clone(),
                index,
            })
            .collect(),
        Projection::Columns(idents) => idents
            .iter()
            .map(|ident| {
                let (index, _) =
                    table
                        .column(&ident.value)
                        .ok_or_else(|| QueryError::UnknownColumn {
                            table: table.name.clone(),
                            column: ident.value.clone(),
                        })?;
                Ok(OutputColumn {
                    name: ident.value.clone(),
                    index,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?,
    };

    let predicate = stmt
        .filter
        .as_ref()
        .map(|p| CompiledPredicate::compile(&table, p))
        .transpose()?;

    debug!(
        table = %table.name,
        columns = columns.len(),
        filtered = predicate.is_some(),
        "query compiled"
    );

    Ok(QueryPlan {
        table,
        columns,
        predicate,
    })
}
