//! Memo and OLE long values.
//!
//! The variable-area slice of a memo/OLE column is a 12-byte header:
//!
//! ```text
//! +-------------------------+----------------+-----------+
//! | flags:2 | length:30 u32 | row pointer u32 | reserved  |
//! +-------------------------+----------------+-----------+
//! ```
//!
//! - `0x8000_0000`: the data follows the header in the row itself
//! - `0x4000_0000`: the data is the whole long-value row at the pointer
//! - neither: a chain of rows, each starting with the u32 pointer of the next

use std::collections::HashSet;

use super::error::DecodeError;
use crate::heap::fetch_row;
use crate::storage::page::read_u32;
use crate::storage::{PageReader, RowPointer};

/// Size of the long-value header.
pub const LONG_VALUE_HEADER: usize = 12;

const FLAG_INLINE: u32 = 0x8000_0000;
const FLAG_SINGLE_PAGE: u32 = 0x4000_0000;
const LENGTH_MASK: u32 = 0x3fff_ffff;
const MAX_PREALLOC_PAGES: usize = 4;

/// Assembles the bytes of a memo or OLE value from its header slice.
pub fn read_long_value(
    reader: &PageReader,
    column: &str,
    raw: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let corrupt = |reason: String| DecodeError::LongValue {
        column: column.to_string(),
        reason,
    };

    let (Some(word), Some(pointer)) = (read_u32(raw, 0), read_u32(raw, 4)) else {
        return Err(corrupt(format!("long value header is only {} bytes", raw.len())));
    };
    let len = (word & LENGTH_MASK) as usize;

    if word & FLAG_INLINE != 0 {
        let data = raw
            .get(LONG_VALUE_HEADER..LONG_VALUE_HEADER + len)
            .ok_or_else(|| corrupt(format!("inline long value shorter than {len} bytes")))?;
        return Ok(data.to_vec());
    }

    let pointer = RowPointer::from_raw(pointer);
    if word & FLAG_SINGLE_PAGE != 0 {
        let row = fetch_row(reader, pointer)?;
        let data = row
            .get(..len)
            .ok_or_else(|| corrupt(format!("long value row {pointer} shorter than {len} bytes")))?;
        return Ok(data.to_vec());
    }

    // The length is unchecked until the chain has been walked
    let mut data = Vec::with_capacity(len.min(reader.page_size() * MAX_PREALLOC_PAGES));
    let mut visited = HashSet::new();
    let mut next = pointer;
    while data.len() < len {
        if next.is_null() {
            return Err(corrupt(format!(
                "long value chain ended after {} of {len} bytes",
                data.len()
            )));
        }
        if !visited.insert(next) {
            return Err(corrupt(format!("cycle in long value chain at {next}")));
        }
        let row = fetch_row(reader, next)?;
        let link = read_u32(&row, 0)
            .ok_or_else(|| corrupt(format!("long value row {next} has no link")))?;
        data.extend_from_slice(&row[4..]);
        next = RowPointer::from_raw(link);
    }
    data.truncate(len);
    Ok(data)
}
