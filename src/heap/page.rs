//! Data page view and row-offset directory.
//!
//! ```text
//! JET4                              JET3
//! +----------------------+ 0        +----------------------+ 0
//! | 0x01 | ?  | free u16 |          | 0x01 | ?  | free u16 |
//! +----------------------+ 4        +----------------------+ 4
//! | owner TDEF page u32  |          | owner TDEF page u32  |
//! +----------------------+ 8        +----------------------+ 8
//! | unknown u32          |          | num_rows u16         |
//! +----------------------+ 12       +----------------------+ 10
//! | num_rows u16         |          | row offsets u16 ...  |
//! +----------------------+ 14       +----------------------+
//! | row offsets u16 ...  |          | free space           |
//! +----------------------+          +----------------------+
//! | free space           |          | rows (row 0 last)    |
//! +----------------------+          +----------------------+ page_size
//! | rows (row 0 last)    |
//! +----------------------+ page_size
//! ```
//!
//! Rows are packed from the end of the page toward the directory, so row
//! `i` ends where row `i - 1` starts.

use bytes::Bytes;

use super::error::ScanError;
use crate::storage::page::{read_u16, read_u32};
use crate::storage::{JetFormat, PageId, PageReader, PageType, RowPointer};

/// Bits of a directory entry holding the row's start offset.
pub const OFFSET_MASK: u16 = 0x1fff;
/// Directory flag: the row holds a pointer to the real row elsewhere.
pub const ROW_FLAG_OVERFLOW: u16 = 0x4000;
/// Directory flag: the row has been deleted.
pub const ROW_FLAG_DELETED: u16 = 0x8000;

/// Offset of the owning TDEF page in a data page header.
const OWNER_OFFSET: usize = 4;

/// One decoded row-offset directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEntry {
    /// Index of the entry in the directory.
    pub index: u16,
    /// First byte of the row.
    pub start: usize,
    /// One past the last byte of the row.
    pub end: usize,
    /// The row was deleted.
    pub deleted: bool,
    /// The row is a pointer to the real row.
    pub overflow: bool,
}

impl RowEntry {
    /// Returns the row length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true for a zero-length row.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Read-only view of a page of type 0x01.
#[derive(Debug, Clone)]
pub struct DataPage {
    id: PageId,
    data: Bytes,
    owner: PageId,
    num_rows: u16,
    row_offsets: usize,
}

impl DataPage {
    /// Interprets `data` as a data page.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::CorruptPage` if the page is not a data page or its
    /// directory runs past the page.
    pub fn new(id: PageId, data: Bytes, format: &JetFormat) -> Result<Self, ScanError> {
        let layout = format.layout();
        if PageType::of(&data) != Some(PageType::Data) {
            return Err(ScanError::corrupt_page(id, "not a data page"));
        }
        let owner = read_u32(&data, OWNER_OFFSET)
            .ok_or_else(|| ScanError::corrupt_page(id, "page header truncated"))?;
        let num_rows = read_u16(&data, layout.data_num_rows)
            .ok_or_else(|| ScanError::corrupt_page(id, "page header truncated"))?;
        let directory_end = layout.data_row_offsets + num_rows as usize * 2;
        if directory_end > data.len() {
            return Err(ScanError::corrupt_page(
                id,
                format!("{num_rows} row entries do not fit in the page"),
            ));
        }

        Ok(Self {
            id,
            data,
            owner: PageId::new(owner),
            num_rows,
            row_offsets: layout.data_row_offsets,
        })
    }

    /// Returns the page number.
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Returns the TDEF page of the table owning this page.
    pub fn owner(&self) -> PageId {
        self.owner
    }

    /// Returns the number of directory entries.
    pub fn num_rows(&self) -> u16 {
        self.num_rows
    }

    fn raw_entry(&self, index: u16) -> u16 {
        read_u16(&self.data, self.row_offsets + index as usize * 2).unwrap_or(0)
    }

    /// Decodes directory entry `index`.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::CorruptPage` for an index past the directory or
    /// bounds that do not describe a slice of the page.
    pub fn entry(&self, index: u16) -> Result<RowEntry, ScanError> {
        if index >= self.num_rows {
            return Err(ScanError::corrupt_page(
                self.id,
                format!("row {index} out of range ({} rows)", self.num_rows),
            ));
        }

        let raw = self.raw_entry(index);
        let start = (raw & OFFSET_MASK) as usize;
        let end = if index == 0 {
            self.data.len()
        } else {
            (self.raw_entry(index - 1) & OFFSET_MASK) as usize
        };

        let directory_end = self.row_offsets + self.num_rows as usize * 2;
        if start < directory_end || start > end || end > self.data.len() {
            return Err(ScanError::corrupt_page(
                self.id,
                format!("row {index} has invalid bounds {start}..{end}"),
            ));
        }

        Ok(RowEntry {
            index,
            start,
            end,
            deleted: raw & ROW_FLAG_DELETED != 0,
            overflow: raw & ROW_FLAG_OVERFLOW != 0,
        })
    }

    /// Returns the bytes of a row; cheap, shares the page buffer.
    pub fn row_bytes(&self, entry: &RowEntry) -> Bytes {
        self.data.slice(entry.start..entry.end)
    }
}

/// Reads the row at `pointer`, as used by usage maps and long values.
///
/// # Errors
///
/// Returns `ScanError::InvalidPointer` if the row was deleted or the entry is
/// invalid, and `ScanError::Storage` if the page cannot be read.
pub fn fetch_row(reader: &PageReader, pointer: RowPointer) -> Result<Bytes, ScanError> {
    let (page, entry) = locate(reader, pointer)?;
    if entry.deleted {
        return Err(ScanError::invalid_pointer(pointer, "row is deleted"));
    }
    Ok(page.row_bytes(&entry))
}

/// Reads the target of an overflow entry.
///
/// Moved rows carry the deleted flag so that scans pass over them; only the
/// forwarding pointer reaches them, so the flag is ignored here.
///
/// # Errors
///
/// Returns `ScanError::InvalidPointer` if the entry is invalid, and
/// `ScanError::Storage` if the page cannot be read.
pub fn fetch_moved_row(reader: &PageReader, pointer: RowPointer) -> Result<Bytes, ScanError> {
    let (page, entry) = locate(reader, pointer)?;
    Ok(page.row_bytes(&entry))
}

fn locate(reader: &PageReader, pointer: RowPointer) -> Result<(DataPage, RowEntry), ScanError> {
    let data = reader.read_page(pointer.page)?;
    let page = DataPage::new(pointer.page, data, reader.format())
        .map_err(|e| ScanError::invalid_pointer(pointer, e.to_string()))?;
    let entry = page
        .entry(u16::from(pointer.row))
        .map_err(|e| ScanError::invalid_pointer(pointer, e.to_string()))?;
    Ok((page, entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JetVersion;

    /// Builds a JET4 data page with the given rows, row 0 packed last.
    fn build_page(owner: u32, rows: &[(&[u8], u16)]) -> Bytes {
        let mut page = vec![0u8; 4096];
        page[0] = 0x01;
        page[4..8].copy_from_slice(&owner.to_le_bytes());
        page[12..14].copy_from_slice(&(rows.len() as u16).to_le_bytes());
        let mut end = page.len();
        for (i, (row, flags)) in rows.iter().enumerate() {
            let start = end - row.len();
            page[start..end].copy_from_slice(row);
            let entry = start as u16 | flags;
            page[14 + i * 2..16 + i * 2].copy_from_slice(&entry.to_le_bytes());
            end = start;
        }
        Bytes::from(page)
    }

    #[test]
    fn test_row_entries() {
        let format = JetFormat::new(JetVersion::Jet4);
        let data = build_page(
            9,
            &[
                (b"first", 0),
                (b"second", ROW_FLAG_DELETED),
                (b"abcd", ROW_FLAG_OVERFLOW),
            ],
        );
        let page = DataPage::new(PageId::new(3), data, &format).unwrap();
        assert_eq!(page.owner(), PageId::new(9));
        assert_eq!(page.num_rows(), 3);

        let first = page.entry(0).unwrap();
        assert_eq!(first.end, 4096);
        assert_eq!(first.len(), 5);
        assert_eq!(&page.row_bytes(&first)[..], b"first");
        assert!(!first.deleted && !first.overflow);

        let second = page.entry(1).unwrap();
        assert!(second.deleted);
        assert_eq!(second.end, first.start);
        assert_eq!(&page.row_bytes(&second)[..], b"second");

        let third = page.entry(2).unwrap();
        assert!(third.overflow);
        assert_eq!(&page.row_bytes(&third)[..], b"abcd");

        assert!(matches!(page.entry(3), Err(ScanError::CorruptPage { .. })));
    }

    #[test]
    fn test_rejects_non_data_page() {
        let format = JetFormat::new(JetVersion::Jet4);
        let mut data = vec![0u8; 4096];
        data[0] = 0x02;
        let err = DataPage::new(PageId::new(5), Bytes::from(data), &format).unwrap_err();
        assert!(matches!(err, ScanError::CorruptPage { page, .. } if page == PageId::new(5)));
    }

    #[test]
    fn test_invalid_row_bounds() {
        let format = JetFormat::new(JetVersion::Jet4);
        let mut data = vec![0u8; 4096];
        data[0] = 0x01;
        data[12..14].copy_from_slice(&1u16.to_le_bytes());
        // Offset pointing into the directory itself
        data[14..16].copy_from_slice(&4u16.to_le_bytes());
        let page = DataPage::new(PageId::new(1), Bytes::from(data), &format).unwrap();
        assert!(page.entry(0).is_err());
    }

    #[test]
    fn test_directory_overflowing_page() {
        let format = JetFormat::new(JetVersion::Jet3);
        let mut data = vec![0u8; 2048];
        data[0] = 0x01;
        data[8..10].copy_from_slice(&u16::MAX.to_le_bytes());
        assert!(DataPage::new(PageId::new(1), Bytes::from(data), &format).is_err());
    }
}
