//! SQL parser using recursive descent.
//!
//! The [`Parser`] converts a stream of tokens into a [`SelectStmt`].

use super::ast::*;
use super::error::{Span, SyntaxError};
use super::lexer::Lexer;
use super::token::{Keyword, Token, TokenKind};

/// SQL parser that converts tokens into an AST.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    input: &'a str,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given SQL input.
    pub fn new(input: &'a str) -> Self {
        Self {
            tokens: Lexer::new(input).collect(),
            pos: 0,
            input,
        }
    }

    /// Parses the input as a single SELECT statement.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the input is empty, contains a lexical
    /// error, or is not a statement of the supported form.
    pub fn parse(&mut self) -> Result<SelectStmt, SyntaxError> {
        if let Some(token) = self.tokens.iter().find(|t| matches!(t.kind, TokenKind::Error(_))) {
            return Err(SyntaxError::new(token.kind.display_name(), token.span));
        }

        let stmt = self.parse_select_stmt()?;

        // Optional trailing semicolon
        self.consume_token(TokenKind::Semicolon);

        if !self.is_eof() {
            let span = self.current_span();
            return Err(SyntaxError::unexpected_token(
                "end of input",
                &self.current_token_name(),
                span,
            ));
        }

        Ok(stmt)
    }

    /// Parses `SELECT list FROM table [WHERE predicate]`.
    fn parse_select_stmt(&mut self) -> Result<SelectStmt, SyntaxError> {
        self.expect_keyword(Keyword::Select)?;
        let projection = self.parse_projection()?;
        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier()?;

        let filter = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_predicate()?)
        } else {
            None
        };

        Ok(SelectStmt {
            projection,
            table,
            filter,
        })
    }

    fn parse_projection(&mut self) -> Result<Projection, SyntaxError> {
        if self.consume_token(TokenKind::Asterisk) {
            return Ok(Projection::Wildcard);
        }

        let mut columns = vec![self.expect_identifier()?];
        while self.consume_token(TokenKind::Comma) {
            columns.push(self.expect_identifier()?);
        }
        Ok(Projection::Columns(columns))
    }

    fn parse_predicate(&mut self) -> Result<Predicate, SyntaxError> {
        let column = self.expect_identifier()?;

        if self.consume_keyword(Keyword::Is) {
            let negated = self.consume_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Null)?;
            return Ok(Predicate::IsNull { column, negated });
        }

        if self.consume_keyword(Keyword::Like) {
            return match self.peek_kind() {
                Some(TokenKind::String(pattern)) => {
                    let pattern = pattern.clone();
                    self.advance();
                    Ok(Predicate::Like { column, pattern })
                }
                _ => Err(SyntaxError::unexpected_token(
                    "string pattern",
                    &self.current_token_name(),
                    self.current_span(),
                )),
            };
        }

        let op = match self.peek_kind() {
            Some(TokenKind::Eq) => CompareOp::Eq,
            Some(TokenKind::Neq) => CompareOp::NotEq,
            Some(TokenKind::Lt) => CompareOp::Lt,
            Some(TokenKind::LtEq) => CompareOp::LtEq,
            Some(TokenKind::Gt) => CompareOp::Gt,
            Some(TokenKind::GtEq) => CompareOp::GtEq,
            _ => {
                return Err(SyntaxError::unexpected_token(
                    "comparison operator, LIKE or IS",
                    &self.current_token_name(),
                    self.current_span(),
                ));
            }
        };
        self.advance();

        let (value, span) = self.parse_literal()?;
        Ok(Predicate::Compare {
            column,
            op,
            value,
            span,
        })
    }

    /// Parses a literal, folding a leading sign into numbers.
    fn parse_literal(&mut self) -> Result<(Literal, Span), SyntaxError> {
        let start = self.current_span();
        let negative = if self.consume_token(TokenKind::Minus) {
            true
        } else {
            self.consume_token(TokenKind::Plus);
            false
        };
        let signed = start != self.current_span();

        let span = start.extend(self.current_span());
        let literal = match self.peek_kind() {
            Some(TokenKind::Integer(n)) => {
                let n = *n;
                Literal::Integer(if negative { -n } else { n })
            }
            Some(TokenKind::Float(n)) => {
                let n = *n;
                Literal::Float(if negative { -n } else { n })
            }
            Some(TokenKind::String(s)) if !signed => Literal::String(s.clone()),
            Some(TokenKind::Date(s)) if !signed => Literal::Date(s.clone()),
            Some(TokenKind::Keyword(Keyword::True)) if !signed => Literal::Boolean(true),
            Some(TokenKind::Keyword(Keyword::False)) if !signed => Literal::Boolean(false),
            _ => {
                let expected = if signed { "number" } else { "literal" };
                return Err(SyntaxError::unexpected_token(
                    expected,
                    &self.current_token_name(),
                    self.current_span(),
                ));
            }
        };
        self.advance();
        Ok((literal, span))
    }

    // Helper methods

    /// Returns true when only the end-of-input token remains.
    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Eof))
    }

    /// Peeks at the current token.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Peeks at the kind of the current token.
    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// Advances to the next token.
    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().map_or(Span::at(self.input.len()), |t| t.span)
    }

    /// Returns a display name for the current token.
    pub(crate) fn current_token_name(&self) -> String {
        self.peek()
            .map_or("end of input".to_string(), |t| t.kind.display_name())
    }

    /// Checks if the current token is a specific keyword.
    pub(crate) fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Keyword(k)) if *k == kw)
    }

    /// Consumes the current token if it's a specific keyword.
    pub(crate) fn consume_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific keyword, returning an error if not found.
    pub(crate) fn expect_keyword(&mut self, kw: Keyword) -> Result<(), SyntaxError> {
        if self.consume_keyword(kw) {
            Ok(())
        } else {
            let span = self.current_span();
            Err(SyntaxError::unexpected_token(
                &format!("keyword '{}'", kw.as_str()),
                &self.current_token_name(),
                span,
            ))
        }
    }

    /// Checks if the current token matches.
    pub(crate) fn check_token(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(&kind)
    }

    /// Consumes the current token if it matches.
    pub(crate) fn consume_token(&mut self, kind: TokenKind) -> bool {
        if self.check_token(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects an identifier, returning it with its span.
    pub(crate) fn expect_identifier(&mut self) -> Result<Ident, SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name),
                span,
            }) => {
                let ident = Ident::new(name.clone(), *span);
                self.advance();
                Ok(ident)
            }
            _ => {
                let span = self.current_span();
                Err(SyntaxError::unexpected_token(
                    "identifier",
                    &self.current_token_name(),
                    span,
                ))
            }
        }
    }
}
