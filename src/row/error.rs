//! Row decoding errors.

use thiserror::Error;

use crate::heap::ScanError;

/// A row-local failure; the rest of the table stays readable.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The row is shorter than its layout requires.
    #[error("row truncated: {0}")]
    Truncated(String),

    /// The column's type code is not understood.
    #[error("column {column} has unsupported type code 0x{code:02x}")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// Raw type code.
        code: u8,
    },

    /// A date/time value is outside the representable range.
    #[error("column {column} holds an invalid date value {days}")]
    InvalidDate {
        /// Column name.
        column: String,
        /// Raw days-since-epoch value.
        days: f64,
    },

    /// A memo or OLE value could not be assembled.
    #[error("column {column}: {reason}")]
    LongValue {
        /// Column name.
        column: String,
        /// What was wrong.
        reason: String,
    },

    /// Reading a long-value page failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl DecodeError {
    pub(crate) fn truncated(what: impl Into<String>) -> Self {
        DecodeError::Truncated(what.into())
    }
}
