//! Table scan errors.

use thiserror::Error;

use crate::storage::{PageId, RowPointer, StorageError};

/// Errors raised while locating or reading a table's rows.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A page could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A data page header or row directory is invalid.
    #[error("corrupt data page {page}: {reason}")]
    CorruptPage {
        /// Offending page.
        page: PageId,
        /// What was wrong.
        reason: String,
    },

    /// A row pointer does not resolve to a live row.
    #[error("invalid row pointer {pointer}: {reason}")]
    InvalidPointer {
        /// The pointer that failed.
        pointer: RowPointer,
        /// What was wrong.
        reason: String,
    },

    /// A usage map row has an unknown type or layout.
    #[error("corrupt usage map at {pointer}: {reason}")]
    CorruptUsageMap {
        /// Location of the map row.
        pointer: RowPointer,
        /// What was wrong.
        reason: String,
    },
}

impl ScanError {
    pub(crate) fn corrupt_page(page: PageId, reason: impl Into<String>) -> Self {
        ScanError::CorruptPage {
            page,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pointer(pointer: RowPointer, reason: impl Into<String>) -> Self {
        ScanError::InvalidPointer {
            pointer,
            reason: reason.into(),
        }
    }
}
