//! JET engine versions and their on-disk layouts.
//!
//! JET3 (Access 97) and JET4 (Access 2000 and later, including the ACE
//! `.accdb` variants) differ in page size, header widths and the encoding of
//! names and text. Everything that depends on the version is collected in a
//! [`Layout`] so the rest of the crate reads offsets instead of branching.

use crate::storage::error::StorageError;

/// Offset of the signature string in the header page.
pub const SIGNATURE_OFFSET: usize = 4;

/// Offset of the u32 version field in the header page.
pub const VERSION_OFFSET: usize = 0x14;

/// Leading magic bytes of every JET file.
pub const MAGIC: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// Signature written by the JET engine.
pub const JET_SIGNATURE: &[u8] = b"Standard Jet DB";

/// Signature written by the ACE engine (`.accdb`).
pub const ACE_SIGNATURE: &[u8] = b"Standard ACE DB";

/// Engine generation recorded in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JetVersion {
    /// Access 97.
    Jet3,
    /// Access 2000 to 2003.
    Jet4,
    /// Access 2007 and later; shares the JET4 layout.
    Ace(u32),
}

impl JetVersion {
    /// Interprets the header version field.
    pub fn from_code(code: u32) -> Result<Self, StorageError> {
        match code {
            0 => Ok(JetVersion::Jet3),
            1 => Ok(JetVersion::Jet4),
            2..=6 => Ok(JetVersion::Ace(code)),
            other => Err(StorageError::UnsupportedVersion(other)),
        }
    }

    /// Returns the header version field for this version.
    pub fn code(&self) -> u32 {
        match self {
            JetVersion::Jet3 => 0,
            JetVersion::Jet4 => 1,
            JetVersion::Ace(code) => *code,
        }
    }
}

/// Byte offsets and sizes for one JET generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Size of every page in the file.
    pub page_size: usize,

    // TDEF header
    /// Declared row count.
    pub tdef_num_rows: usize,
    /// Table type byte (0x53 system, 0x4e user).
    pub tdef_table_type: usize,
    /// Number of variable-length columns.
    pub tdef_num_var_cols: usize,
    /// Number of columns.
    pub tdef_num_cols: usize,
    /// Number of logical indexes.
    pub tdef_num_idx: usize,
    /// Number of physical indexes.
    pub tdef_num_real_idx: usize,
    /// Usage map row pointer.
    pub tdef_usage_map: usize,
    /// Start of the real-index entries.
    pub tdef_cols_start: usize,
    /// Size of one real-index entry.
    pub real_idx_entry_size: usize,

    // TDEF column entries
    /// Size of one column entry.
    pub col_entry_size: usize,
    /// Column number within the entry.
    pub col_num: usize,
    /// Variable-column index within the entry.
    pub col_var_index: usize,
    /// Numeric precision within the entry.
    pub col_precision: usize,
    /// Numeric scale within the entry.
    pub col_scale: usize,
    /// Flag byte within the entry.
    pub col_flags: usize,
    /// Fixed-data offset within the entry.
    pub col_fixed_offset: usize,
    /// Declared length within the entry.
    pub col_size: usize,
    /// Width of the length prefix of a column name.
    pub name_len_size: usize,

    // Data pages
    /// Row count field of a data page.
    pub data_num_rows: usize,
    /// First entry of the row-offset directory.
    pub data_row_offsets: usize,

    // Rows
    /// Width of the column count and variable-column fields inside a row.
    pub row_count_size: usize,
}

/// JET3 layout (2 KiB pages, single-byte names and text).
pub const JET3_LAYOUT: Layout = Layout {
    page_size: 2048,
    tdef_num_rows: 12,
    tdef_table_type: 20,
    tdef_num_var_cols: 23,
    tdef_num_cols: 25,
    tdef_num_idx: 27,
    tdef_num_real_idx: 31,
    tdef_usage_map: 35,
    tdef_cols_start: 43,
    real_idx_entry_size: 8,
    col_entry_size: 18,
    col_num: 1,
    col_var_index: 3,
    col_precision: 9,
    col_scale: 10,
    col_flags: 13,
    col_fixed_offset: 14,
    col_size: 16,
    name_len_size: 1,
    data_num_rows: 8,
    data_row_offsets: 10,
    row_count_size: 1,
};

/// JET4 layout (4 KiB pages, UCS-2 names and text).
pub const JET4_LAYOUT: Layout = Layout {
    page_size: 4096,
    tdef_num_rows: 16,
    tdef_table_type: 40,
    tdef_num_var_cols: 43,
    tdef_num_cols: 45,
    tdef_num_idx: 47,
    tdef_num_real_idx: 51,
    tdef_usage_map: 55,
    tdef_cols_start: 63,
    real_idx_entry_size: 12,
    col_entry_size: 25,
    col_num: 5,
    col_var_index: 7,
    col_precision: 11,
    col_scale: 12,
    col_flags: 15,
    col_fixed_offset: 21,
    col_size: 23,
    name_len_size: 2,
    data_num_rows: 12,
    data_row_offsets: 14,
    row_count_size: 2,
};

/// A detected file format: version plus layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JetFormat {
    version: JetVersion,
    layout: &'static Layout,
}

impl JetFormat {
    /// Returns the format for a version.
    pub fn new(version: JetVersion) -> Self {
        let layout = match version {
            JetVersion::Jet3 => &JET3_LAYOUT,
            JetVersion::Jet4 | JetVersion::Ace(_) => &JET4_LAYOUT,
        };
        Self { version, layout }
    }

    /// Detects the format from the leading bytes of the header page.
    ///
    /// # Errors
    ///
    /// Returns `NotJetDatabase` for a bad magic or signature and
    /// `UnsupportedVersion` for an unknown version field.
    pub fn detect(header: &[u8]) -> Result<Self, StorageError> {
        if header.len() < VERSION_OFFSET + 4 {
            return Err(StorageError::Truncated {
                len: header.len() as u64,
                needed: (VERSION_OFFSET + 4) as u64,
            });
        }
        if header[..4] != MAGIC {
            return Err(StorageError::NotJetDatabase);
        }
        let signature = &header[SIGNATURE_OFFSET..SIGNATURE_OFFSET + JET_SIGNATURE.len()];
        if signature != JET_SIGNATURE && signature != ACE_SIGNATURE {
            return Err(StorageError::NotJetDatabase);
        }
        let code = u32::from_le_bytes([
            header[VERSION_OFFSET],
            header[VERSION_OFFSET + 1],
            header[VERSION_OFFSET + 2],
            header[VERSION_OFFSET + 3],
        ]);
        Ok(Self::new(JetVersion::from_code(code)?))
    }

    /// Returns the engine version.
    pub fn version(&self) -> JetVersion {
        self.version
    }

    /// Returns the byte layout for this version.
    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.layout.page_size
    }

    /// Returns true for JET3 files.
    pub fn is_jet3(&self) -> bool {
        self.version == JetVersion::Jet3
    }
}
