//! Page layer errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::PageId;

/// Errors raised while mounting a file or reading its pages.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file could not be opened or read.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is shorter than its header requires.
    ///
    /// Raised when the file cannot hold the version field or a single page.
    #[error("file truncated: {len} bytes, need at least {needed}")]
    Truncated {
        /// Actual file length.
        len: u64,
        /// Minimum length required.
        needed: u64,
    },

    /// The header signature does not identify a JET or ACE database.
    #[error("not a JET database file")]
    NotJetDatabase,

    /// The header version field is not one this reader understands.
    #[error("unsupported JET version 0x{0:02x}")]
    UnsupportedVersion(u32),

    /// A page past the end of the file was requested.
    #[error("page {page} out of range (file has {count} pages)")]
    PageOutOfRange {
        /// Requested page.
        page: PageId,
        /// Number of whole pages in the file.
        count: u32,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
