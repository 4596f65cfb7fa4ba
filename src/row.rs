//! Row decoding.
//!
//! A stored row is cracked into its fixed area, variable-column slices and
//! null mask, then each requested column is converted to a typed [`Value`].
//!
//! ```text
//! +-----------+------------------+-----------------+-----------+------+
//! | col count | fixed data ...   | variable data   | var table | mask |
//! +-----------+------------------+-----------------+-----------+------+
//! 0           count_size                                        end
//! ```
//!
//! Memo and OLE columns hold a 12-byte long-value header in the variable
//! area; the data itself may live on other pages.

mod decoder;
mod error;
mod long_value;
pub mod text;
mod value;

pub use decoder::RowDecoder;
pub use error::DecodeError;
pub use long_value::read_long_value;
pub use value::{Value, datetime_from_days};
