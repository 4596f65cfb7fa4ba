//! Converts raw rows into typed values.

use std::sync::Arc;

use super::error::DecodeError;
use super::long_value::read_long_value;
use super::text::decode_text;
use super::value::{Value, datetime_from_days};
use crate::catalog::{ColumnDef, ColumnType, TableDef};
use crate::heap::RawRow;
use crate::storage::PageReader;
use crate::storage::page::{
    read_f32, read_f64, read_i16, read_i32, read_i64, read_u8, read_u16, read_u32,
};

/// Sign bit in the first byte of a stored numeric.
const NUMERIC_NEGATIVE: u8 = 0x80;

/// A row split into its parts; borrowed from the row bytes.
#[derive(Debug)]
pub struct CrackedRow<'a> {
    data: &'a [u8],
    /// Column count recorded in the row; later columns were added after the
    /// row was written.
    num_cols: usize,
    null_mask: &'a [u8],
    /// `var_count + 1` offsets; slice `k` is `offsets[k]..offsets[k + 1]`.
    var_offsets: Vec<usize>,
}

impl CrackedRow<'_> {
    fn is_present(&self, column: &ColumnDef) -> bool {
        let number = column.number as usize;
        if number >= self.num_cols {
            return false;
        }
        self.null_mask
            .get(number / 8)
            .is_some_and(|byte| byte & (1 << (number % 8)) != 0)
    }

    fn var_slice(&self, index: usize) -> Option<Result<&[u8], DecodeError>> {
        let (&start, &end) = (self.var_offsets.get(index)?, self.var_offsets.get(index + 1)?);
        Some(self.data.get(start..end).ok_or_else(|| {
            DecodeError::truncated(format!("variable column {index} spans {start}..{end}"))
        }))
    }
}

/// Decodes rows of one table.
///
/// Holds the page reader so memo and OLE values stored on other pages can be
/// resolved.
#[derive(Debug, Clone)]
pub struct RowDecoder {
    reader: Arc<PageReader>,
    table: Arc<TableDef>,
}

impl RowDecoder {
    /// Creates a decoder for rows of `table`.
    pub fn new(reader: Arc<PageReader>, table: Arc<TableDef>) -> Self {
        Self { reader, table }
    }

    /// Returns the table this decoder reads.
    pub fn table(&self) -> &Arc<TableDef> {
        &self.table
    }

    /// Decodes the columns at the given indexes, in the order given.
    pub fn decode(&self, row: &RawRow, columns: &[usize]) -> Result<Vec<Value>, DecodeError> {
        let cracked = self.crack(&row.data)?;
        columns
            .iter()
            .map(|&idx| self.value(&cracked, idx))
            .collect()
    }

    /// Splits a row into its null mask and variable-column offsets.
    pub fn crack<'a>(&self, data: &'a [u8]) -> Result<CrackedRow<'a>, DecodeError> {
        let format = self.reader.format();
        let count_size = format.layout().row_count_size;
        let len = data.len();

        let num_cols = if format.is_jet3() {
            read_u8(data, 0).map(usize::from)
        } else {
            read_u16(data, 0).map(usize::from)
        }
        .ok_or_else(|| DecodeError::truncated("missing column count"))?;

        let mask_len = num_cols.div_ceil(8);
        if len < count_size + mask_len {
            return Err(DecodeError::truncated(format!(
                "{len} bytes cannot hold {num_cols} columns"
            )));
        }
        let null_mask = &data[len - mask_len..];

        let var_offsets = if self.table.num_var_cols == 0 {
            Vec::new()
        } else if format.is_jet3() {
            jet3_var_offsets(data, mask_len)?
        } else {
            jet4_var_offsets(data, mask_len)?
        };

        Ok(CrackedRow {
            data,
            num_cols,
            null_mask,
            var_offsets,
        })
    }

    /// Decodes column `idx` of a cracked row.
    pub fn value(&self, row: &CrackedRow<'_>, idx: usize) -> Result<Value, DecodeError> {
        let column = self
            .table
            .columns
            .get(idx)
            .ok_or_else(|| DecodeError::truncated(format!("no column at index {idx}")))?;

        let present = row.is_present(column);
        if column.column_type == ColumnType::Boolean {
            return Ok(Value::Boolean(present));
        }
        if let ColumnType::Opaque(code) = column.column_type {
            return Err(DecodeError::UnsupportedType {
                column: column.name.clone(),
                code,
            });
        }
        if !present {
            return Ok(Value::Null);
        }

        let bytes = if column.is_fixed() {
            let width = column
                .column_type
                .fixed_width()
                .unwrap_or(column.size as usize);
            let start = self.reader.format().layout().row_count_size + column.fixed_offset as usize;
            row.data.get(start..start + width).ok_or_else(|| {
                DecodeError::truncated(format!("fixed column {} at {start}", column.name))
            })?
        } else {
            match row.var_slice(column.var_index as usize) {
                Some(slice) => slice?,
                None => return Ok(Value::Null),
            }
        };

        self.convert(column, bytes)
    }

    fn convert(&self, column: &ColumnDef, b: &[u8]) -> Result<Value, DecodeError> {
        let short = || DecodeError::truncated(format!("column {} has {} bytes", column.name, b.len()));
        let format = self.reader.format();

        let value = match column.column_type {
            ColumnType::Byte => Value::Byte(read_u8(b, 0).ok_or_else(short)?),
            ColumnType::Int => Value::Int(read_i16(b, 0).ok_or_else(short)?),
            ColumnType::Long => Value::Long(read_i32(b, 0).ok_or_else(short)?),
            ColumnType::Money => Value::Money(read_i64(b, 0).ok_or_else(short)?),
            ColumnType::Float => Value::Float(read_f32(b, 0).ok_or_else(short)?),
            ColumnType::Double => Value::Double(read_f64(b, 0).ok_or_else(short)?),
            ColumnType::DateTime => {
                let days = read_f64(b, 0).ok_or_else(short)?;
                let dt = datetime_from_days(days).ok_or_else(|| DecodeError::InvalidDate {
                    column: column.name.clone(),
                    days,
                })?;
                Value::DateTime(dt)
            }
            ColumnType::Guid => {
                let guid: [u8; 16] = b.get(..16).and_then(|g| g.try_into().ok()).ok_or_else(short)?;
                Value::Guid(guid)
            }
            ColumnType::Numeric => {
                let sign = read_u8(b, 0).ok_or_else(short)?;
                let mut magnitude = 0u128;
                for word in 0..4 {
                    let w = read_u32(b, 1 + word * 4).ok_or_else(short)?;
                    magnitude = (magnitude << 32) | u128::from(w);
                }
                Value::Numeric {
                    negative: sign & NUMERIC_NEGATIVE != 0,
                    magnitude,
                    scale: column.scale,
                }
            }
            ColumnType::Text => Value::Text(decode_text(format, b)),
            ColumnType::Binary => Value::Binary(b.to_vec()),
            ColumnType::Memo => {
                let data = read_long_value(&self.reader, &column.name, b)?;
                Value::Text(decode_text(format, &data))
            }
            ColumnType::Ole => Value::Binary(read_long_value(&self.reader, &column.name, b)?),
            ColumnType::Boolean => Value::Boolean(true),
            ColumnType::Opaque(code) => {
                return Err(DecodeError::UnsupportedType {
                    column: column.name.clone(),
                    code,
                });
            }
        };
        Ok(value)
    }
}

/// JET4: u16 variable count before the mask, then u16 offsets growing
/// toward the start of the row.
fn jet4_var_offsets(data: &[u8], mask_len: usize) -> Result<Vec<usize>, DecodeError> {
    let len = data.len();
    let count_at = len
        .checked_sub(mask_len + 2)
        .ok_or_else(|| DecodeError::truncated("missing variable column count"))?;
    let var_count = read_u16(data, count_at)
        .ok_or_else(|| DecodeError::truncated("missing variable column count"))?
        as usize;

    (0..=var_count)
        .map(|i| {
            count_at
                .checked_sub(2 + 2 * i)
                .and_then(|at| read_u16(data, at))
                .map(usize::from)
                .ok_or_else(|| DecodeError::truncated(format!("variable offset {i} outside row")))
        })
        .collect()
}

/// JET3: u8 variable count before the mask, then a jump table (one entry
/// per 256 bytes of row) and u8 offsets growing toward the start of the row.
fn jet3_var_offsets(data: &[u8], mask_len: usize) -> Result<Vec<usize>, DecodeError> {
    let truncated = || DecodeError::truncated("variable column table outside row");
    let row_end = data.len().checked_sub(1).ok_or_else(truncated)?;
    let count_at = row_end.checked_sub(mask_len).ok_or_else(truncated)?;
    let var_count = read_u8(data, count_at).ok_or_else(truncated)? as usize;

    let mut num_jumps = row_end / 256;
    let col_ptr = count_at.checked_sub(num_jumps + 1).ok_or_else(truncated)?;
    // The last jump slot is unused when the offsets stop short of it
    if num_jumps > 0 && col_ptr.saturating_sub(var_count) / 256 < num_jumps {
        num_jumps -= 1;
    }

    let mut jumps_used = 0;
    let mut offsets = Vec::with_capacity(var_count + 1);
    for i in 0..=var_count {
        while jumps_used < num_jumps
            && read_u8(data, count_at - jumps_used - 1).map(usize::from) == Some(i)
        {
            jumps_used += 1;
        }
        let at = col_ptr.checked_sub(i).ok_or_else(truncated)?;
        let offset = read_u8(data, at).ok_or_else(truncated)? as usize;
        offsets.push(offset + jumps_used * 256);
    }
    Ok(offsets)
}
