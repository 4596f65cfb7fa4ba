//! Query text errors.
//!
//! Every token and AST name carries a [`Span`] into the query string, so a
//! rejected `SELECT` can report where it went wrong.

use thiserror::Error;

/// Byte range `start..end` of the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Empty span, used for end of input.
    pub fn at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    /// Smallest span covering both.
    pub fn extend(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A query that does not match the `SELECT ... FROM ... [WHERE ...]` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at position {}", self.position())]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::new(format!("expected {expected}, found {found}"), span)
    }

    /// 1-based offset of the first offending byte.
    pub fn position(&self) -> usize {
        self.span.start + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_at_end_of_input() {
        let sql = "SELECT * FROM";
        assert_eq!(Span::at(sql.len()), Span::new(13, 13));
    }

    #[test]
    fn test_span_extend_covers_column_list() {
        // "SiteID" and "Depth" in "SELECT SiteID, Depth FROM Sites"
        let first = Span::new(7, 13);
        let last = Span::new(15, 20);
        assert_eq!(first.extend(last), Span::new(7, 20));
        assert_eq!(last.extend(first), Span::new(7, 20));
    }

    #[test]
    fn test_missing_table_name() {
        let err = SyntaxError::unexpected_token("table name", "end of input", Span::at(14));
        assert_eq!(err.position(), 15);
        assert_eq!(
            err.to_string(),
            "expected table name, found end of input at position 15"
        );
    }
}
