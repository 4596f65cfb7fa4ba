//! Query compilation and execution errors.

use thiserror::Error;

use crate::catalog::TypeClass;
use crate::heap::ScanError;
use crate::row::DecodeError;
use crate::storage::PageId;

/// Errors binding a statement to the catalog.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Referenced table does not exist.
    #[error("table \"{0}\" does not exist")]
    UnknownTable(String),

    /// Referenced column does not exist in the table.
    #[error("column \"{column}\" does not exist in table \"{table}\"")]
    UnknownColumn {
        /// Table searched.
        table: String,
        /// Column as written.
        column: String,
    },

    /// The literal cannot be compared with the column.
    #[error("cannot compare {} column \"{column}\" with {found}", expected.as_str())]
    TypeMismatch {
        /// Column as written.
        column: String,
        /// Class of the column.
        expected: TypeClass,
        /// Kind of literal given.
        found: &'static str,
    },

    /// A date literal could not be read.
    #[error("invalid date literal '{value}' for column \"{column}\"")]
    InvalidDate {
        /// Column as written.
        column: String,
        /// Literal text.
        value: String,
    },

    /// The column's type cannot be filtered on.
    #[error("column \"{column}\" has unsupported type {type_name}")]
    UnsupportedType {
        /// Column as written.
        column: String,
        /// Declared type.
        type_name: String,
    },

    /// The operator does not apply to the column's type.
    #[error("operator {op} is not supported on {} column \"{column}\"", class.as_str())]
    UnsupportedOperator {
        /// Column as written.
        column: String,
        /// Operator as written.
        op: String,
        /// Class of the column.
        class: TypeClass,
    },
}

/// Errors produced while streaming results.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A row could not be decoded; the stream continues after it.
    #[error("undecodable row {page}:{row} in table \"{table}\": {source}")]
    Decode {
        /// Table being read.
        table: String,
        /// Page of the row.
        page: PageId,
        /// Directory index of the row.
        row: u16,
        /// What went wrong.
        #[source]
        source: DecodeError,
    },

    /// The table's pages could not be read; the stream ends.
    #[error(transparent)]
    Scan(#[from] ScanError),
}
