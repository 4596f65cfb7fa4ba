//! Abstract syntax tree of the query subset.
//!
//! ```text
//! SELECT (* | ident {, ident}) FROM ident
//!   [WHERE ident op literal | ident LIKE 'pattern' | ident IS [NOT] NULL] [;]
//! ```

use std::fmt;

use super::error::Span;

/// An identifier as written in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Name with quoting removed.
    pub value: String,
    /// Where the identifier appears in the source.
    pub span: Span,
}

impl Ident {
    /// Creates an identifier.
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Selected columns.
    pub projection: Projection,
    /// Source table.
    pub table: Ident,
    /// Optional WHERE condition.
    pub filter: Option<Predicate>,
}

/// The select list.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`: every column in catalog order.
    Wildcard,
    /// Named columns in the order written.
    Columns(Vec<Ident>),
}

/// A single-column WHERE condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column op literal`
    Compare {
        /// Column being tested.
        column: Ident,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand side.
        value: Literal,
        /// Span of the literal.
        span: Span,
    },
    /// `column LIKE 'pattern'`
    Like {
        /// Column being tested.
        column: Ident,
        /// Pattern with `%`/`*` and `_`/`?` wildcards.
        pattern: String,
    },
    /// `column IS [NOT] NULL`
    IsNull {
        /// Column being tested.
        column: Ident,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
}

impl Predicate {
    /// Returns the column the condition tests.
    pub fn column(&self) -> &Ident {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::Like { column, .. }
            | Predicate::IsNull { column, .. } => column,
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    /// Returns the operator as written in SQL.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }

    /// Returns true for `=` and `<>`.
    pub fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::NotEq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal on the right of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// `'text'`
    String(String),
    /// Signed integer.
    Integer(i64),
    /// Signed float.
    Float(f64),
    /// `TRUE` or `FALSE`.
    Boolean(bool),
    /// `#...#`, unparsed.
    Date(String),
}

impl Literal {
    /// Returns a short description for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "string",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::Boolean(_) => "boolean",
            Literal::Date(_) => "date",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Literal::Date(s) => write!(f, "#{s}#"),
        }
    }
}
