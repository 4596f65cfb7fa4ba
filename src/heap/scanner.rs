//! Lazy iterator over the live rows of a table.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::error::ScanError;
use super::page::{DataPage, fetch_moved_row};
use super::usage_map::UsageMap;
use crate::catalog::TableDef;
use crate::storage::page::read_u32;
use crate::storage::{PageId, PageReader, PageType, RowPointer};

/// A row as stored on disk, not yet decoded.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// Page the row bytes came from.
    pub page: PageId,
    /// Directory index on that page.
    pub row: u16,
    /// Row bytes.
    pub data: Bytes,
}

/// Iterator over a table's rows in usage-map order.
///
/// Pages are read one at a time as the iterator advances. Pages that are not
/// data pages owned by the table are skipped, as are deleted rows. Overflow
/// entries are replaced by the row they point at; that row is flagged
/// deleted in place, so it is seen once.
///
/// A storage error ends the scan: it is yielded once and the iterator is
/// fused afterwards.
pub struct TableScanner {
    reader: Arc<PageReader>,
    table: String,
    owner: PageId,
    pages: std::vec::IntoIter<PageId>,
    current: Option<DataPage>,
    next_row: u16,
    done: bool,
}

impl TableScanner {
    /// Creates a scanner over `table`, resolving its usage map.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::CorruptUsageMap` if the usage map cannot be
    /// interpreted and `ScanError::Storage` if it cannot be read.
    pub fn new(reader: Arc<PageReader>, table: &TableDef) -> Result<Self, ScanError> {
        let map = UsageMap::load(&reader, table.usage_map)?;
        let page_count = reader.page_count();
        let pages: Vec<PageId> = map
            .pages(&reader)?
            .into_iter()
            .filter(|page| {
                let in_file = page.page_num() < page_count;
                if !in_file {
                    debug!(table = %table.name, page = %page, "usage map names a page past end of file");
                }
                in_file
            })
            .collect();
        debug!(table = %table.name, pages = pages.len(), "table scan started");

        Ok(Self {
            reader,
            table: table.name.clone(),
            owner: table.tdef_page,
            pages: pages.into_iter(),
            current: None,
            next_row: 0,
            done: false,
        })
    }

    /// Advances to the next page owned by the table.
    ///
    /// Returns `Ok(false)` when the usage map is exhausted.
    fn advance_page(&mut self) -> Result<bool, ScanError> {
        for page_id in self.pages.by_ref() {
            let data = self.reader.read_page(page_id)?;
            if PageType::of(&data) != Some(PageType::Data) {
                debug!(table = %self.table, page = %page_id, "skipping non-data page");
                continue;
            }
            let page = match DataPage::new(page_id, data, self.reader.format()) {
                Ok(page) => page,
                Err(e) => {
                    warn!(table = %self.table, error = %e, "skipping unreadable data page");
                    continue;
                }
            };
            if page.owner() != self.owner {
                debug!(
                    table = %self.table,
                    page = %page_id,
                    owner = %page.owner(),
                    "skipping page owned by another table"
                );
                continue;
            }
            self.current = Some(page);
            self.next_row = 0;
            return Ok(true);
        }
        Ok(false)
    }

    /// Reads the row an overflow entry points at.
    fn follow_overflow(&self, page: PageId, stub: &[u8]) -> Result<RawRow, ScanError> {
        let raw = read_u32(stub, 0)
            .ok_or_else(|| ScanError::corrupt_page(page, "overflow row shorter than a pointer"))?;
        let pointer = RowPointer::from_raw(raw);
        let data = fetch_moved_row(&self.reader, pointer)?;
        Ok(RawRow {
            page: pointer.page,
            row: u16::from(pointer.row),
            data,
        })
    }
}

impl Iterator for TableScanner {
    type Item = Result<RawRow, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let Some(page) = self.current.as_ref() else {
                match self.advance_page() {
                    Ok(true) => continue,
                    Ok(false) => {
                        self.done = true;
                        return None;
                    }
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                }
            };

            if self.next_row >= page.num_rows() {
                self.current = None;
                continue;
            }
            let index = self.next_row;
            self.next_row += 1;

            let entry = match page.entry(index) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(table = %self.table, error = %e, "skipping malformed row entry");
                    continue;
                }
            };
            if entry.deleted {
                continue;
            }

            let page_id = page.id();
            let data = page.row_bytes(&entry);
            if !entry.overflow {
                return Some(Ok(RawRow {
                    page: page_id,
                    row: index,
                    data,
                }));
            }

            match self.follow_overflow(page_id, &data) {
                Ok(row) => return Some(Ok(row)),
                Err(e) => {
                    warn!(
                        table = %self.table,
                        page = %page_id,
                        row = index,
                        error = %e,
                        "skipping unreadable overflow row"
                    );
                }
            }
        }
    }
}

impl std::iter::FusedIterator for TableScanner {}
