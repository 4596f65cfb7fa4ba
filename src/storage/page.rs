//! Page identifiers, page types and little-endian field access.
//!
//! All integers in a JET file are little-endian. The helpers here return
//! `None` instead of panicking when a field would run past the buffer, so
//! callers can turn short reads into format errors.

use std::fmt;

use bytes::Buf;

/// Page number within a JET file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// The file header page.
    pub const HEADER: PageId = PageId(0);

    /// TDEF page of the `MSysObjects` system table.
    pub const SYSTEM_OBJECTS: PageId = PageId(2);

    /// Creates a new PageId from a page number.
    pub const fn new(page_num: u32) -> Self {
        Self(page_num)
    }

    /// Returns the page number.
    pub const fn page_num(&self) -> u32 {
        self.0
    }

    /// Byte offset of this page for the given page size.
    pub const fn byte_offset(&self, page_size: usize) -> u64 {
        self.0 as u64 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page type tag stored in the first byte of every page.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// File header (page 0 only).
    Database = 0x00,
    /// Data page holding table rows or long values.
    Data = 0x01,
    /// Table definition page.
    TableDef = 0x02,
    /// Intermediate index page.
    IndexNode = 0x03,
    /// Leaf index page.
    IndexLeaf = 0x04,
    /// Page usage bitmap.
    UsageBitmap = 0x05,
}

impl PageType {
    /// Creates a PageType from a raw u8 value.
    ///
    /// Returns `None` if the value doesn't match any known page type.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x00 => Some(PageType::Database),
            0x01 => Some(PageType::Data),
            0x02 => Some(PageType::TableDef),
            0x03 => Some(PageType::IndexNode),
            0x04 => Some(PageType::IndexLeaf),
            0x05 => Some(PageType::UsageBitmap),
            _ => None,
        }
    }

    /// Returns the type of the given page buffer.
    pub fn of(page: &[u8]) -> Option<Self> {
        page.first().copied().and_then(Self::from_u8)
    }
}

/// Packed reference to a row: page number in the high 24 bits, row index in
/// the low 8 bits.
///
/// Used for usage maps, long values and overflow rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowPointer {
    /// Page holding the row.
    pub page: PageId,
    /// Index into the page's row-offset directory.
    pub row: u8,
}

impl RowPointer {
    /// Unpacks a raw pointer value.
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            page: PageId(raw >> 8),
            row: (raw & 0xff) as u8,
        }
    }

    /// Returns true for the all-zero pointer, which terminates chains.
    pub const fn is_null(&self) -> bool {
        self.page.0 == 0 && self.row == 0
    }
}

impl fmt::Display for RowPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.row)
    }
}

fn field(buf: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    buf.get(offset..offset.checked_add(len)?)
}

/// Reads a byte at `offset`.
pub fn read_u8(buf: &[u8], offset: usize) -> Option<u8> {
    buf.get(offset).copied()
}

/// Reads a little-endian u16 at `offset`.
pub fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    field(buf, offset, 2).map(|mut b| b.get_u16_le())
}

/// Reads a little-endian u32 at `offset`.
pub fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    field(buf, offset, 4).map(|mut b| b.get_u32_le())
}

/// Reads a little-endian i16 at `offset`.
pub fn read_i16(buf: &[u8], offset: usize) -> Option<i16> {
    field(buf, offset, 2).map(|mut b| b.get_i16_le())
}

/// Reads a little-endian i32 at `offset`.
pub fn read_i32(buf: &[u8], offset: usize) -> Option<i32> {
    field(buf, offset, 4).map(|mut b| b.get_i32_le())
}

/// Reads a little-endian i64 at `offset`.
pub fn read_i64(buf: &[u8], offset: usize) -> Option<i64> {
    field(buf, offset, 8).map(|mut b| b.get_i64_le())
}

/// Reads a little-endian f32 at `offset`.
pub fn read_f32(buf: &[u8], offset: usize) -> Option<f32> {
    field(buf, offset, 4).map(|mut b| b.get_f32_le())
}

/// Reads a little-endian f64 at `offset`.
pub fn read_f64(buf: &[u8], offset: usize) -> Option<f64> {
    field(buf, offset, 8).map(|mut b| b.get_f64_le())
}

/// Returns `len` bytes starting at `offset`.
pub fn read_bytes(buf: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    field(buf, offset, len)
}
