//! Table definition (TDEF) page parsing.
//!
//! A table definition starts on a page of type 0x02 and may continue on
//! further TDEF pages linked through the u32 at offset 4. Continuation pages
//! repeat an 8-byte page header, so only their bytes from offset 8 onward
//! extend the definition.
//!
//! ```text
//! +---------------------+ 0
//! | header / counts     |
//! +---------------------+ tdef_cols_start
//! | real index entries  | num_real_idx * real_idx_entry_size
//! +---------------------+
//! | column entries      | num_cols * col_entry_size
//! +---------------------+
//! | column names        | length-prefixed
//! +---------------------+
//! | index data ...      | (not read)
//! +---------------------+
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

use super::error::CatalogError;
use super::types::{ColumnDef, ColumnType, TableDef};
use crate::row::text::decode_text;
use crate::storage::page::{read_bytes, read_u8, read_u16, read_u32};
use crate::storage::{PageId, PageReader, PageType, RowPointer};

/// Table type byte for system tables.
pub const TABLE_TYPE_SYSTEM: u8 = 0x53;
/// Table type byte for user tables.
pub const TABLE_TYPE_USER: u8 = 0x4e;

/// Size of the header repeated on TDEF continuation pages.
const CONTINUATION_HEADER: usize = 8;

/// Reads the TDEF chain starting at `tdef_page` into one contiguous buffer.
pub fn read_tdef_chain(reader: &PageReader, tdef_page: PageId) -> Result<Vec<u8>, CatalogError> {
    let mut buf = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(tdef_page);

    while let Some(page_id) = next {
        if !visited.insert(page_id) {
            return Err(CatalogError::corrupt(page_id, "cycle in table definition chain"));
        }
        let page = reader.read_page(page_id)?;
        if PageType::of(&page) != Some(PageType::TableDef) {
            return Err(CatalogError::corrupt(
                page_id,
                format!("expected table definition page, found type 0x{:02x}", page[0]),
            ));
        }

        if buf.is_empty() {
            buf.extend_from_slice(&page);
        } else {
            buf.extend_from_slice(&page[CONTINUATION_HEADER..]);
        }

        let raw_next = read_u32(&page, 4).unwrap_or(0);
        next = (raw_next != 0).then_some(PageId::new(raw_next));
    }

    if visited.len() > 1 {
        debug!(page = %tdef_page, pages = visited.len(), "table definition spans several pages");
    }
    Ok(buf)
}

/// Reads and parses the table definition at `tdef_page`.
///
/// Column type codes the reader does not know are kept as
/// [`ColumnType::Opaque`]; only reading such a column fails later.
///
/// # Errors
///
/// Returns `CatalogError::Corrupt` when the chain is broken or a field lies
/// outside the definition.
pub fn read_table_def(
    reader: &PageReader,
    tdef_page: PageId,
    name: &str,
) -> Result<TableDef, CatalogError> {
    let buf = read_tdef_chain(reader, tdef_page)?;
    parse_table_def(reader, &buf, tdef_page, name)
}

fn parse_table_def(
    reader: &PageReader,
    buf: &[u8],
    tdef_page: PageId,
    name: &str,
) -> Result<TableDef, CatalogError> {
    let format = reader.format();
    let layout = format.layout();
    let truncated = |what: &str| {
        CatalogError::corrupt(tdef_page, format!("table definition truncated reading {what}"))
    };

    let num_rows = read_u32(buf, layout.tdef_num_rows).ok_or_else(|| truncated("row count"))?;
    let table_type = read_u8(buf, layout.tdef_table_type).ok_or_else(|| truncated("table type"))?;
    let num_var_cols =
        read_u16(buf, layout.tdef_num_var_cols).ok_or_else(|| truncated("variable column count"))?;
    let num_cols = read_u16(buf, layout.tdef_num_cols).ok_or_else(|| truncated("column count"))?;
    let num_real_idx =
        read_u32(buf, layout.tdef_num_real_idx).ok_or_else(|| truncated("index count"))?;
    let usage_map = read_u32(buf, layout.tdef_usage_map).ok_or_else(|| truncated("usage map"))?;

    let mut pos = (num_real_idx as usize)
        .checked_mul(layout.real_idx_entry_size)
        .and_then(|n| n.checked_add(layout.tdef_cols_start))
        .ok_or_else(|| truncated("index entries"))?;

    let mut columns = Vec::with_capacity(num_cols as usize);
    for _ in 0..num_cols {
        let entry = read_bytes(buf, pos, layout.col_entry_size)
            .ok_or_else(|| truncated("column entry"))?;
        let column_type = ColumnType::from_code(entry[0]);
        columns.push(ColumnDef {
            name: String::new(),
            column_type,
            number: read_u16(entry, layout.col_num).unwrap_or(0),
            var_index: read_u16(entry, layout.col_var_index).unwrap_or(0),
            fixed_offset: read_u16(entry, layout.col_fixed_offset).unwrap_or(0),
            size: read_u16(entry, layout.col_size).unwrap_or(0),
            flags: entry[layout.col_flags],
            precision: entry[layout.col_precision],
            scale: entry[layout.col_scale],
        });
        pos += layout.col_entry_size;
    }

    for column in &mut columns {
        let name_len = if layout.name_len_size == 1 {
            read_u8(buf, pos).map(usize::from)
        } else {
            read_u16(buf, pos).map(usize::from)
        }
        .ok_or_else(|| truncated("column name length"))?;
        pos += layout.name_len_size;
        let raw = read_bytes(buf, pos, name_len).ok_or_else(|| truncated("column name"))?;
        column.name = decode_text(format, raw);
        pos += name_len;
    }

    for column in &columns {
        if let ColumnType::Opaque(code) = column.column_type {
            warn!(
                table = name,
                column = %column.name,
                code = format_args!("0x{code:02x}"),
                "unsupported column type; reads of this column will fail"
            );
        }
    }

    columns.sort_by_key(|c| c.number);

    Ok(TableDef {
        name: name.to_string(),
        tdef_page,
        usage_map: RowPointer::from_raw(usage_map),
        num_rows,
        num_var_cols,
        system: table_type == TABLE_TYPE_SYSTEM,
        columns,
    })
}
