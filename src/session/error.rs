//! Session errors and their coarse classification.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::{DatabaseError, OpenError};
use crate::executor::{ExecError, QueryError};
use crate::heap::ScanError;
use crate::storage::StorageError;

/// Errors returned by [`Session`](super::Session) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A database is already open in this session.
    #[error("session busy: {} is already open", path.display())]
    Busy {
        /// File held by the session.
        path: PathBuf,
    },

    /// The operation needs an open database.
    #[error("no database is open")]
    NotOpen,

    /// `fetch` was called before any successful query.
    #[error("no active query")]
    NoActiveQuery,

    /// The file could not be opened.
    #[error(transparent)]
    Open(#[from] OpenError),

    /// The query text was rejected.
    #[error(transparent)]
    Query(#[from] DatabaseError),

    /// A row could not be produced during a fetch.
    #[error(transparent)]
    Row(#[from] ExecError),
}

/// Classification of a [`SessionError`] for callers that only need a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The file is missing, unreadable or not a JET database.
    Io,
    /// The system catalog is damaged.
    CorruptCatalog,
    /// The query text does not parse.
    Syntax,
    /// The query names a missing table.
    UnknownTable,
    /// The query names a missing column.
    UnknownColumn,
    /// The filter literal does not fit the column type.
    TypeMismatch,
    /// The filter column has a type that cannot be compared.
    UnsupportedType,
    /// The filter operator does not apply to the column type.
    UnsupportedOperator,
    /// A row or data page could not be read.
    Decode,
    /// `open` was called with a database already open.
    Busy,
    /// The session has no open database.
    NotOpen,
    /// The session has no query to fetch from.
    NoActiveQuery,
}

impl ErrorKind {
    /// Returns a short name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Io => "io",
            ErrorKind::CorruptCatalog => "corrupt catalog",
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownTable => "unknown table",
            ErrorKind::UnknownColumn => "unknown column",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::UnsupportedType => "unsupported type",
            ErrorKind::UnsupportedOperator => "unsupported operator",
            ErrorKind::Decode => "decode",
            ErrorKind::Busy => "busy",
            ErrorKind::NotOpen => "not open",
            ErrorKind::NoActiveQuery => "no active query",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionError {
    /// Classifies the error.
    ///
    /// I/O failures while loading the catalog count as `Io`; everything else
    /// that goes wrong in the system tables is `CorruptCatalog`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Busy { .. } => ErrorKind::Busy,
            SessionError::NotOpen => ErrorKind::NotOpen,
            SessionError::NoActiveQuery => ErrorKind::NoActiveQuery,
            SessionError::Open(OpenError::Storage(_)) => ErrorKind::Io,
            SessionError::Open(OpenError::Catalog(e)) => match e {
                CatalogError::Storage(StorageError::Io { .. })
                | CatalogError::Scan(ScanError::Storage(StorageError::Io { .. })) => ErrorKind::Io,
                _ => ErrorKind::CorruptCatalog,
            },
            SessionError::Query(DatabaseError::Parse(_)) => ErrorKind::Syntax,
            SessionError::Query(DatabaseError::Query(e)) => match e {
                QueryError::UnknownTable(_) => ErrorKind::UnknownTable,
                QueryError::UnknownColumn { .. } => ErrorKind::UnknownColumn,
                QueryError::TypeMismatch { .. } | QueryError::InvalidDate { .. } => {
                    ErrorKind::TypeMismatch
                }
                QueryError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
                QueryError::UnsupportedOperator { .. } => ErrorKind::UnsupportedOperator,
            },
            SessionError::Row(ExecError::Scan(ScanError::Storage(StorageError::Io { .. }))) => {
                ErrorKind::Io
            }
            SessionError::Row(_) => ErrorKind::Decode,
        }
    }
}
