//! WHERE conditions bound to a column and checked against decoded values.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};

use super::error::QueryError;
use crate::catalog::{TableDef, TypeClass};
use crate::row::Value;
use crate::sql::{CompareOp, Literal, Predicate};

/// Accepted layouts of a date literal, with and without a time part.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A predicate bound to a table column.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    /// Index of the tested column in the table definition.
    pub column: usize,
    test: Test,
}

#[derive(Debug, Clone, PartialEq)]
enum Test {
    IsNull { negated: bool },
    Like(LikePattern),
    Compare { op: CompareOp, operand: Operand },
}

/// Right-hand side converted to the column's class.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
}

impl CompiledPredicate {
    /// Binds `predicate` to a column of `table`, checking the literal's type.
    pub fn compile(table: &TableDef, predicate: &Predicate) -> Result<Self, QueryError> {
        let name = &predicate.column().value;
        let (column, def) = table
            .column(name)
            .ok_or_else(|| QueryError::UnknownColumn {
                table: table.name.clone(),
                column: name.clone(),
            })?;
        let class = def.class();
        if class == TypeClass::Opaque {
            return Err(QueryError::UnsupportedType {
                column: name.clone(),
                type_name: def.column_type.name(),
            });
        }

        let test = match predicate {
            Predicate::IsNull { negated, .. } => Test::IsNull { negated: *negated },
            Predicate::Like { pattern, .. } => {
                if class != TypeClass::Text {
                    return Err(QueryError::UnsupportedOperator {
                        column: name.clone(),
                        op: "LIKE".to_string(),
                        class,
                    });
                }
                Test::Like(LikePattern::new(pattern))
            }
            Predicate::Compare { op, value, .. } => Test::Compare {
                op: *op,
                operand: operand_for(name, class, *op, value)?,
            },
        };

        Ok(Self { column, test })
    }

    /// Returns true if `value` satisfies the condition. Null satisfies only
    /// `IS NULL`.
    pub fn matches(&self, value: &Value) -> bool {
        match &self.test {
            Test::IsNull { negated } => value.is_null() != *negated,
            _ if value.is_null() => false,
            Test::Like(pattern) => pattern.matches(&value.to_string()),
            Test::Compare { op, operand } => compare(value, operand).is_some_and(|ord| match op {
                CompareOp::Eq => ord == Ordering::Equal,
                CompareOp::NotEq => ord != Ordering::Equal,
                CompareOp::Lt => ord == Ordering::Less,
                CompareOp::LtEq => ord != Ordering::Greater,
                CompareOp::Gt => ord == Ordering::Greater,
                CompareOp::GtEq => ord != Ordering::Less,
            }),
        }
    }
}

fn operand_for(
    column: &str,
    class: TypeClass,
    op: CompareOp,
    literal: &Literal,
) -> Result<Operand, QueryError> {
    let mismatch = || QueryError::TypeMismatch {
        column: column.to_string(),
        expected: class,
        found: literal.kind_name(),
    };

    match class {
        TypeClass::Text => match literal {
            Literal::String(s) => Ok(Operand::Text(s.clone())),
            _ => Err(mismatch()),
        },
        TypeClass::Integer | TypeClass::Float => match literal {
            Literal::Integer(n) => Ok(Operand::Number(*n as f64)),
            Literal::Float(n) => Ok(Operand::Number(*n)),
            _ => Err(mismatch()),
        },
        TypeClass::Boolean => {
            if !op.is_equality() {
                return Err(QueryError::UnsupportedOperator {
                    column: column.to_string(),
                    op: op.to_string(),
                    class,
                });
            }
            match literal {
                Literal::Boolean(b) => Ok(Operand::Boolean(*b)),
                Literal::Integer(0) => Ok(Operand::Boolean(false)),
                Literal::Integer(1 | -1) => Ok(Operand::Boolean(true)),
                _ => Err(mismatch()),
            }
        }
        TypeClass::Date => match literal {
            Literal::String(s) | Literal::Date(s) => {
                parse_date(s).map(Operand::Date).ok_or_else(|| QueryError::InvalidDate {
                    column: column.to_string(),
                    value: s.clone(),
                })
            }
            _ => Err(mismatch()),
        },
        TypeClass::Binary => Err(QueryError::UnsupportedOperator {
            column: column.to_string(),
            op: op.to_string(),
            class,
        }),
        TypeClass::Opaque => Err(QueryError::UnsupportedType {
            column: column.to_string(),
            type_name: "opaque".to_string(),
        }),
    }
}

/// Reads a date literal in ISO or US layout, optionally with a time.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn compare(value: &Value, operand: &Operand) -> Option<Ordering> {
    match operand {
        Operand::Text(s) => Some(cmp_ignore_ascii_case(&value.to_string(), s)),
        Operand::Number(n) => value.as_f64()?.partial_cmp(n),
        Operand::Boolean(b) => Some(value.as_bool()?.cmp(b)),
        Operand::Date(d) => match value {
            Value::DateTime(v) => Some(v.cmp(d)),
            _ => None,
        },
    }
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// A LIKE pattern; `%`/`*` match any run, `_`/`?` match one character.
/// Matching ignores ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikePattern {
    tokens: Vec<LikeToken>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    Any,
    One,
    Char(char),
}

impl LikePattern {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Self {
        let tokens = pattern
            .chars()
            .map(|c| match c {
                '%' | '*' => LikeToken::Any,
                '_' | '?' => LikeToken::One,
                c => LikeToken::Char(c.to_ascii_lowercase()),
            })
            .collect();
        Self { tokens }
    }

    /// Returns true if the whole of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
        let (mut t, mut p) = (0, 0);
        // Last `Any` seen: (pattern index after it, text index it resumes from)
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(LikeToken::Any) => {
                    p += 1;
                    backtrack = Some((p, t));
                }
                Some(LikeToken::One) => {
                    p += 1;
                    t += 1;
                }
                Some(LikeToken::Char(c)) if *c == text[t] => {
                    p += 1;
                    t += 1;
                }
                _ => match backtrack {
                    Some((bp, bt)) => {
                        p = bp;
                        t = bt + 1;
                        backtrack = Some((bp, bt + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|tok| *tok == LikeToken::Any)
    }
}
