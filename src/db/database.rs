//! The open-database handle.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::error::{DatabaseError, OpenError};
use crate::catalog::Catalog;
use crate::executor::{self, DecodeErrorPolicy, QueryPlan, ResultRows};
use crate::sql::Parser;
use crate::storage::PageReader;

/// An open JET file and its catalog.
#[derive(Debug)]
pub struct Database {
    reader: Arc<PageReader>,
    catalog: Catalog,
}

impl Database {
    /// Opens a file and loads its catalog.
    ///
    /// On failure nothing stays open: the file handle is dropped before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns `OpenError::Storage` if the file cannot be read or is not a
    /// JET database, and `OpenError::Catalog` if its system tables are corrupt.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let reader = Arc::new(PageReader::open(path)?);
        let catalog = Catalog::load(&reader)?;
        info!(
            path = %reader.path().display(),
            version = ?reader.format().version(),
            tables = catalog.user_tables().count(),
            "database opened"
        );
        Ok(Self { reader, catalog })
    }

    /// Returns the shared page reader.
    pub fn reader(&self) -> &Arc<PageReader> {
        &self.reader
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parses and compiles a query against this database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Parse` for malformed text and
    /// `DatabaseError::Query` for unknown names or ill-typed filters.
    pub fn prepare(&self, text: &str) -> Result<QueryPlan, DatabaseError> {
        let stmt = Parser::new(text).parse()?;
        Ok(executor::compile(&stmt, &self.catalog)?)
    }

    /// Starts streaming the results of a compiled plan.
    pub fn execute(&self, plan: &QueryPlan, policy: DecodeErrorPolicy) -> ResultRows {
        executor::execute(self.reader.clone(), plan, policy)
    }
}
