//! Database-level errors.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::executor::QueryError;
use crate::sql::SyntaxError;
use crate::storage::StorageError;

/// Errors opening a file.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The file is missing, unreadable or not a JET database.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The system catalog could not be loaded.
    #[error("cannot load catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Errors preparing a query against an open database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The query text does not parse.
    #[error("syntax error: {0}")]
    Parse(#[from] SyntaxError),

    /// The query does not fit the catalog.
    #[error(transparent)]
    Query(#[from] QueryError),
}
