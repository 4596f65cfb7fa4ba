//! Handle on one open JET file.
//!
//! The [`Database`] type owns the page reader and the catalog loaded from it.
//! Both live exactly as long as the handle: dropping it closes the file.
//!
//! # Architecture
//!
//! ```text
//! +------------------------------------------------+
//! |                    Database                    |
//! |                                                |
//! |  +-------------------+   +------------------+  |
//! |  | Arc<PageReader>   |   | Catalog          |  |
//! |  | (file handle,     |   | (tables,         |  |
//! |  |  JET format)      |   |  columns)        |  |
//! |  +---------+---------+   +---------+--------+  |
//! +------------|-----------------------|-----------+
//!              |                       |
//!              v                       v
//!   TableScanner / RowDecoder     executor::compile
//! ```

mod database;
mod error;

pub use database::Database;
pub use error::{DatabaseError, OpenError};
