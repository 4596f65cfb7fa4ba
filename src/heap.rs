//! Table data pages and row scanning.
//!
//! A table's rows live on data pages (type 0x01) that name the table's TDEF
//! page as their owner. Which pages belong to a table is recorded in its
//! usage map, a bitmap stored as a row on some other page.
//!
//! - [`DataPage`]: row-offset directory of one data page
//! - [`UsageMap`]: inline or reference bitmap of a table's pages
//! - [`TableScanner`]: lazy iterator over a table's live rows

mod error;
mod page;
mod scanner;
mod usage_map;

pub use error::ScanError;
pub use page::{
    DataPage, OFFSET_MASK, ROW_FLAG_DELETED, ROW_FLAG_OVERFLOW, RowEntry, fetch_moved_row,
    fetch_row,
};
pub use scanner::{RawRow, TableScanner};
pub use usage_map::UsageMap;
