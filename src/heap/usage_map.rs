//! Usage maps: which pages belong to a table.
//!
//! The map is stored as a row; its first byte selects the layout.
//!
//! ```text
//! type 0 (inline)     [0x00][start page u32][bitmap ...]
//! type 1 (reference)  [0x01][bitmap page u32][bitmap page u32] ...
//! ```
//!
//! An inline bit `i` marks page `start + i`. A reference map points at pages
//! of type 0x05 whose bits, from offset 4, cover `(page_size - 4) * 8` pages
//! each; bitmap page `j` starts at page `j * (page_size - 4) * 8`.

use bytes::Bytes;

use super::error::ScanError;
use super::page::fetch_row;
use crate::storage::page::read_u32;
use crate::storage::{PageId, PageReader, PageType, RowPointer};

const MAP_TYPE_INLINE: u8 = 0x00;
const MAP_TYPE_REFERENCE: u8 = 0x01;

/// Offset of the bitmap inside a type 0x05 page.
const BITMAP_PAGE_HEADER: usize = 4;

/// A parsed usage map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageMap {
    /// Bitmap stored in the map row itself.
    Inline {
        /// Page of bit 0.
        start: u32,
        /// Bits, least significant first.
        bitmap: Bytes,
    },
    /// Bitmap spread over dedicated bitmap pages.
    Reference {
        /// Bitmap pages in order; `None` where the slot is unused.
        bitmap_pages: Vec<Option<PageId>>,
    },
}

impl UsageMap {
    /// Reads the map row at `pointer`.
    pub fn load(reader: &PageReader, pointer: RowPointer) -> Result<Self, ScanError> {
        let row = fetch_row(reader, pointer).map_err(|e| match e {
            ScanError::Storage(e) => ScanError::Storage(e),
            other => ScanError::CorruptUsageMap {
                pointer,
                reason: other.to_string(),
            },
        })?;
        Self::parse(pointer, row)
    }

    /// Parses a map row.
    pub fn parse(pointer: RowPointer, row: Bytes) -> Result<Self, ScanError> {
        let corrupt = |reason: String| ScanError::CorruptUsageMap { pointer, reason };

        match row.first().copied() {
            Some(MAP_TYPE_INLINE) => {
                let start = read_u32(&row, 1)
                    .ok_or_else(|| corrupt("inline map too short".to_string()))?;
                Ok(UsageMap::Inline {
                    start,
                    bitmap: row.slice(5..),
                })
            }
            Some(MAP_TYPE_REFERENCE) => {
                let bitmap_pages = row[1..]
                    .chunks_exact(4)
                    .map(|chunk| {
                        let page = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                        (page != 0).then_some(PageId::new(page))
                    })
                    .collect();
                Ok(UsageMap::Reference { bitmap_pages })
            }
            Some(other) => Err(corrupt(format!("unknown map type 0x{other:02x}"))),
            None => Err(corrupt("empty map row".to_string())),
        }
    }

    /// Lists the pages marked in use, in ascending order.
    ///
    /// Reference maps read their bitmap pages here.
    pub fn pages(&self, reader: &PageReader) -> Result<Vec<PageId>, ScanError> {
        match self {
            UsageMap::Inline { start, bitmap } => Ok(set_bits(bitmap, *start)),
            UsageMap::Reference { bitmap_pages } => {
                let per_page = ((reader.page_size() - BITMAP_PAGE_HEADER) * 8) as u32;
                let mut pages = Vec::new();
                for (j, bitmap_page) in bitmap_pages.iter().enumerate() {
                    let Some(bitmap_page) = bitmap_page else {
                        continue;
                    };
                    let data = reader.read_page(*bitmap_page)?;
                    if PageType::of(&data) != Some(PageType::UsageBitmap) {
                        return Err(ScanError::corrupt_page(
                            *bitmap_page,
                            "usage map points at a page that is not a bitmap page",
                        ));
                    }
                    let base = (j as u32).saturating_mul(per_page);
                    pages.extend(set_bits(&data[BITMAP_PAGE_HEADER..], base));
                }
                Ok(pages)
            }
        }
    }
}

/// Page numbers of the set bits in `bitmap`, bit 0 being page `base`.
fn set_bits(bitmap: &[u8], base: u32) -> Vec<PageId> {
    let mut pages = Vec::new();
    for (byte_idx, &byte) in bitmap.iter().enumerate() {
        if byte == 0 {
            continue;
        }
        for bit in 0..8 {
            if byte & (1 << bit) != 0 {
                let page = base.saturating_add((byte_idx * 8 + bit) as u32);
                pages.push(PageId::new(page));
            }
        }
    }
    pages
}
