//! Page layer for JET database files.
//!
//! A JET file is a sequence of fixed-size pages. The first page carries the
//! file signature and the engine version, which in turn fixes the page size
//! and the byte layout of every other structure in the file.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | Catalog / Scanner |
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | PageReader        |  <- random access by PageId
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | JetFormat/Layout  |  <- per-version offsets
//! +-------------------+
//! ```
//!
//! The reader never writes; every file is opened read-only.

pub mod error;
pub mod format;
pub mod page;
pub mod reader;

pub use error::StorageError;
pub use format::{JetFormat, JetVersion, Layout};
pub use page::{PageId, PageType, RowPointer};
pub use reader::PageReader;
