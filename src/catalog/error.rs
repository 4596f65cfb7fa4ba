//! Catalog loading errors.

use thiserror::Error;

use crate::heap::ScanError;
use crate::storage::{PageId, StorageError};

/// Errors that make a file's catalog unreadable.
///
/// Any of these is fatal to opening the database.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A catalog page could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A table definition or system row is structurally invalid.
    #[error("corrupt catalog at page {page}: {reason}")]
    Corrupt {
        /// Page where the problem was detected.
        page: PageId,
        /// What was wrong.
        reason: String,
    },

    /// `MSysObjects` does not declare a column the loader depends on.
    #[error("MSysObjects has no {0} column")]
    MissingSystemColumn(&'static str),

    /// `MSysObjects` could not be scanned.
    #[error("failed to scan MSysObjects: {0}")]
    Scan(#[from] ScanError),
}

impl CatalogError {
    pub(crate) fn corrupt(page: PageId, reason: impl Into<String>) -> Self {
        CatalogError::Corrupt {
            page,
            reason: reason.into(),
        }
    }
}
