//! Decoded column values and their text form.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Seconds in a day.
const SECONDS_PER_DAY: i64 = 86_400;

/// Currency values are stored as integers scaled by this factor.
const MONEY_SCALE: i64 = 10_000;

/// Days further than this from the epoch are rejected as corrupt.
const MAX_DAYS: f64 = 3_000_000.0;

/// A single decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value stored.
    Null,
    /// Yes/No.
    Boolean(bool),
    /// Unsigned byte.
    Byte(u8),
    /// 16-bit integer.
    Int(i16),
    /// 32-bit integer.
    Long(i32),
    /// Currency in ten-thousandths.
    Money(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Text, memo included.
    Text(String),
    /// Binary data, OLE included.
    Binary(Vec<u8>),
    /// Replication ID in stored byte order.
    Guid([u8; 16]),
    /// Scaled decimal.
    Numeric {
        /// Sign.
        negative: bool,
        /// Unscaled magnitude.
        magnitude: u128,
        /// Digits after the decimal point.
        scale: u8,
    },
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as an integer if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(i64::from(*n)),
            Value::Int(n) => Some(i64::from(*n)),
            Value::Long(n) => Some(i64::from(*n)),
            _ => None,
        }
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Byte(n) => Some(f64::from(*n)),
            Value::Int(n) => Some(f64::from(*n)),
            Value::Long(n) => Some(f64::from(*n)),
            Value::Money(n) => Some(*n as f64 / MONEY_SCALE as f64),
            Value::Float(n) => Some(f64::from(*n)),
            Value::Double(n) => Some(*n),
            Value::Numeric {
                negative,
                magnitude,
                scale,
            } => {
                let v = *magnitude as f64 / 10f64.powi(i32::from(*scale));
                Some(if *negative { -v } else { v })
            }
            _ => None,
        }
    }

    /// Returns the value of a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Formats the value as text, `None` for [`Value::Null`].
    pub fn to_text(&self) -> Option<String> {
        (!self.is_null()).then(|| self.to_string())
    }
}

/// Converts an Access date (days since 1899-12-30, fraction = time of day).
///
/// The time part is taken from the absolute fraction, so `-1.25` is
/// 1899-12-29 06:00. Returns `None` for values outside the supported range.
pub fn datetime_from_days(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() || days.abs() > MAX_DAYS {
        return None;
    }
    let whole = days.trunc();
    let mut day_offset = whole as i64;
    let mut seconds = ((days - whole).abs() * SECONDS_PER_DAY as f64).round() as i64;
    if seconds >= SECONDS_PER_DAY {
        day_offset += 1;
        seconds -= SECONDS_PER_DAY;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(TimeDelta::try_days(day_offset)?)?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)?;
    Some(date.and_time(time))
}

fn write_scaled(f: &mut fmt::Formatter<'_>, negative: bool, magnitude: u128, scale: u8) -> fmt::Result {
    let digits = magnitude.to_string();
    let scale = scale as usize;
    if negative && magnitude != 0 {
        f.write_str("-")?;
    }
    if scale == 0 {
        return f.write_str(&digits);
    }
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    write!(f, "{int_part}.{frac_part}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
            Value::Byte(n) => write!(f, "{n}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Money(n) => write_scaled(f, *n < 0, u128::from(n.unsigned_abs()), 4),
            Value::Float(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => f.write_str(s),
            Value::Binary(b) => f.write_str(&hex::encode_upper(b)),
            Value::Guid(g) => write!(
                f,
                "{{{:08X}-{:04X}-{:04X}-{}-{}}}",
                u32::from_le_bytes([g[0], g[1], g[2], g[3]]),
                u16::from_le_bytes([g[4], g[5]]),
                u16::from_le_bytes([g[6], g[7]]),
                hex::encode_upper(&g[8..10]),
                hex::encode_upper(&g[10..16]),
            ),
            Value::Numeric {
                negative,
                magnitude,
                scale,
            } => write_scaled(f, *negative, *magnitude, *scale),
        }
    }
}
