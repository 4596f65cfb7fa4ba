//! Table and column definitions read from TDEF pages.

use crate::storage::{PageId, RowPointer};

/// Column flag: value is stored in the fixed-width area of the row.
pub const COLUMN_FLAG_FIXED: u8 = 0x01;
/// Column flag: column accepts NULL.
pub const COLUMN_FLAG_NULLABLE: u8 = 0x02;
/// Column flag: value is generated by an AutoNumber counter.
pub const COLUMN_FLAG_AUTO_NUMBER: u8 = 0x04;

/// Declared column type, keyed by the JET type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Yes/No, stored in the null mask.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int,
    /// Signed 32-bit integer.
    Long,
    /// Currency, 64-bit integer scaled by 10^4.
    Money,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Days since 1899-12-30 as a 64-bit float.
    DateTime,
    /// Short binary (up to 255 bytes).
    Binary,
    /// Short text (up to 255 characters).
    Text,
    /// OLE object, stored as a long value.
    Ole,
    /// Memo text, stored as a long value.
    Memo,
    /// Replication ID (GUID).
    Guid,
    /// Fixed-point decimal with explicit precision and scale.
    Numeric,
    /// A type code this reader does not understand.
    Opaque(u8),
}

impl ColumnType {
    /// Maps a JET type code to a column type.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => ColumnType::Boolean,
            0x02 => ColumnType::Byte,
            0x03 => ColumnType::Int,
            0x04 => ColumnType::Long,
            0x05 => ColumnType::Money,
            0x06 => ColumnType::Float,
            0x07 => ColumnType::Double,
            0x08 => ColumnType::DateTime,
            0x09 => ColumnType::Binary,
            0x0A => ColumnType::Text,
            0x0B => ColumnType::Ole,
            0x0C => ColumnType::Memo,
            0x0F => ColumnType::Guid,
            0x10 => ColumnType::Numeric,
            other => ColumnType::Opaque(other),
        }
    }

    /// Returns the JET type code.
    pub fn code(&self) -> u8 {
        match self {
            ColumnType::Boolean => 0x01,
            ColumnType::Byte => 0x02,
            ColumnType::Int => 0x03,
            ColumnType::Long => 0x04,
            ColumnType::Money => 0x05,
            ColumnType::Float => 0x06,
            ColumnType::Double => 0x07,
            ColumnType::DateTime => 0x08,
            ColumnType::Binary => 0x09,
            ColumnType::Text => 0x0A,
            ColumnType::Ole => 0x0B,
            ColumnType::Memo => 0x0C,
            ColumnType::Guid => 0x0F,
            ColumnType::Numeric => 0x10,
            ColumnType::Opaque(code) => *code,
        }
    }

    /// Width of a fixed-size value, or `None` when the declared column
    /// length decides.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ColumnType::Boolean => Some(0),
            ColumnType::Byte => Some(1),
            ColumnType::Int => Some(2),
            ColumnType::Long | ColumnType::Float => Some(4),
            ColumnType::Money | ColumnType::Double | ColumnType::DateTime => Some(8),
            ColumnType::Guid => Some(16),
            ColumnType::Numeric => Some(17),
            _ => None,
        }
    }

    /// Returns the comparison class of this type.
    pub fn class(&self) -> TypeClass {
        match self {
            ColumnType::Text | ColumnType::Memo | ColumnType::Guid => TypeClass::Text,
            ColumnType::Byte | ColumnType::Int | ColumnType::Long => TypeClass::Integer,
            ColumnType::Money | ColumnType::Float | ColumnType::Double | ColumnType::Numeric => {
                TypeClass::Float
            }
            ColumnType::Boolean => TypeClass::Boolean,
            ColumnType::DateTime => TypeClass::Date,
            ColumnType::Binary | ColumnType::Ole => TypeClass::Binary,
            ColumnType::Opaque(_) => TypeClass::Opaque,
        }
    }

    /// Returns a display name for messages and listings.
    pub fn name(&self) -> String {
        match self {
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Byte => "byte".to_string(),
            ColumnType::Int => "int".to_string(),
            ColumnType::Long => "long".to_string(),
            ColumnType::Money => "money".to_string(),
            ColumnType::Float => "float".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::DateTime => "datetime".to_string(),
            ColumnType::Binary => "binary".to_string(),
            ColumnType::Text => "text".to_string(),
            ColumnType::Ole => "ole".to_string(),
            ColumnType::Memo => "memo".to_string(),
            ColumnType::Guid => "guid".to_string(),
            ColumnType::Numeric => "numeric".to_string(),
            ColumnType::Opaque(code) => format!("opaque(0x{code:02x})"),
        }
    }
}

/// Coarse type family used to type-check predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// Text, memo and GUID columns.
    Text,
    /// Byte, int and long columns.
    Integer,
    /// Float, double, money and numeric columns.
    Float,
    /// Yes/No columns.
    Boolean,
    /// Date/time columns.
    Date,
    /// Binary and OLE columns.
    Binary,
    /// Columns with an unknown type code.
    Opaque,
}

impl TypeClass {
    /// Returns the lowercase name of this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeClass::Text => "text",
            TypeClass::Integer => "integer",
            TypeClass::Float => "float",
            TypeClass::Boolean => "boolean",
            TypeClass::Date => "date",
            TypeClass::Binary => "binary",
            TypeClass::Opaque => "opaque",
        }
    }
}

/// A column as declared in a table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
    /// Column number; also the bit index in a row's null mask.
    pub number: u16,
    /// Index into a row's variable-column offset table.
    pub var_index: u16,
    /// Offset within the fixed-width area of a row.
    pub fixed_offset: u16,
    /// Declared length in bytes.
    pub size: u16,
    /// Raw flag byte.
    pub flags: u8,
    /// Numeric precision (numeric columns only).
    pub precision: u8,
    /// Numeric scale (numeric columns only).
    pub scale: u8,
}

impl ColumnDef {
    /// Returns true if the value lives in the fixed-width area.
    pub fn is_fixed(&self) -> bool {
        self.flags & COLUMN_FLAG_FIXED != 0
    }

    /// Returns true if the column accepts NULL.
    pub fn is_nullable(&self) -> bool {
        self.flags & COLUMN_FLAG_NULLABLE != 0
    }

    /// Returns true for AutoNumber columns.
    pub fn is_auto_number(&self) -> bool {
        self.flags & COLUMN_FLAG_AUTO_NUMBER != 0
    }

    /// Returns the type class of this column.
    pub fn class(&self) -> TypeClass {
        self.column_type.class()
    }
}

/// A table as described by its TDEF page chain.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Table name from `MSysObjects`.
    pub name: String,
    /// First page of the TDEF chain; data pages carry it as their owner.
    pub tdef_page: PageId,
    /// Pointer to the usage map row listing the table's pages.
    pub usage_map: RowPointer,
    /// Row count recorded in the TDEF header.
    pub num_rows: u32,
    /// Number of variable-length columns.
    pub num_var_cols: u16,
    /// True for `MSys*` and other system tables.
    pub system: bool,
    /// Columns ordered by column number.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Looks up a column by name, ignoring ASCII case.
    ///
    /// Returns the column's position in [`columns`](Self::columns).
    pub fn column(&self, name: &str) -> Option<(usize, &ColumnDef)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns the column names in catalog order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
