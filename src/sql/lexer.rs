//! SQL lexer/tokenizer.
//!
//! The [`Lexer`] converts a query string into a stream of [`Token`]s.
//! It handles keywords, identifiers, literals, operators, and comments.

use super::error::Span;
use super::token::{Keyword, Token, TokenKind};

/// SQL lexer that tokenizes input strings.
///
/// The lexer implements `Iterator<Item = Token>`. It handles:
/// - Keywords (case-insensitive)
/// - Identifiers (unquoted, double-quoted and bracketed)
/// - Numeric literals (integers and floats, unsigned)
/// - String literals (single-quoted with '' escape)
/// - Date literals (`#...#`)
/// - Comparison operators and punctuation
/// - Comments (-- line comments and /* */ block comments)
///
/// Lexical errors are returned as `TokenKind::Error` tokens rather than
/// being accumulated separately.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether EOF has been returned.
    eof_returned: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            eof_returned: false,
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    /// Returns the character at `pos + offset` without consuming it.
    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    /// Advances the position by `n` characters.
    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(ch) = self.peek(0) {
                self.pos += ch.len_utf8();
            }
        }
    }

    /// Skips whitespace and comments.
    ///
    /// Returns `Some(Token)` if an error was encountered (e.g., unterminated block comment),
    /// `None` otherwise.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            self.skip_whitespace();
            match self.skip_comment() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(token) => return Some(token),
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(|ch| ch.is_whitespace()) {
            self.advance(1);
        }
    }

    /// Attempts to skip a comment.
    fn skip_comment(&mut self) -> Result<bool, Token> {
        if self.starts_with("--") {
            self.advance(2);
            while let Some(ch) = self.peek(0) {
                self.advance(1);
                if ch == '\n' {
                    break;
                }
            }
            return Ok(true);
        }

        if self.starts_with("/*") {
            let start = self.pos;
            self.advance(2);
            while !self.is_eof() && !self.starts_with("*/") {
                self.advance(1);
            }
            if self.is_eof() {
                return Err(Token::new(
                    TokenKind::Error("unterminated block comment".to_string()),
                    Span::new(start, self.pos),
                ));
            }
            self.advance(2);
            return Ok(true);
        }

        Ok(false)
    }

    /// Scans the next token from the input.
    fn scan_token(&mut self) -> Token {
        if let Some(error_token) = self.skip_whitespace_and_comments() {
            return error_token;
        }

        let start = self.pos;
        let Some(ch) = self.peek(0) else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };

        match ch {
            '\'' => self.scan_delimited('\'', true, TokenKind::String, "string literal"),
            '"' => self.scan_delimited(
                '"',
                true,
                TokenKind::QuotedIdentifier,
                "quoted identifier",
            ),
            '[' => self.scan_delimited(
                ']',
                false,
                TokenKind::QuotedIdentifier,
                "bracketed identifier",
            ),
            '#' => self.scan_delimited('#', false, TokenKind::Date, "date literal"),
            c if c.is_ascii_digit()
                || (c == '.' && self.peek(1).is_some_and(|c| c.is_ascii_digit())) =>
            {
                self.scan_number()
            }
            c if is_ident_start(c) => self.scan_identifier_or_keyword(),
            _ => self.scan_operator_or_punctuation(),
        }
    }

    /// Scans text up to the closing delimiter.
    ///
    /// With `doubled_escape`, two closing delimiters in a row stand for one
    /// literal delimiter.
    fn scan_delimited(
        &mut self,
        close: char,
        doubled_escape: bool,
        make: impl FnOnce(String) -> TokenKind,
        what: &str,
    ) -> Token {
        let start = self.pos;
        self.advance(1); // consume opening delimiter

        let mut value = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Token::new(
                        TokenKind::Error(format!("unterminated {what}")),
                        Span::new(start, self.pos),
                    );
                }
                Some(ch) if ch == close => {
                    self.advance(1);
                    if doubled_escape && self.peek(0) == Some(close) {
                        value.push(close);
                        self.advance(1);
                    } else {
                        break;
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance(1);
                }
            }
        }

        Token::new(make(value), Span::new(start, self.pos))
    }

    fn scan_digits(&mut self) {
        while self.peek(0).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance(1);
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.scan_digits();

        let mut is_float = false;
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(1);
            self.scan_digits();
        }

        let mut invalid_exponent = false;
        if let Some('e' | 'E') = self.peek(0) {
            is_float = true;
            self.advance(1);
            if let Some('+' | '-') = self.peek(0) {
                self.advance(1);
            }
            let exp_start = self.pos;
            self.scan_digits();
            invalid_exponent = self.pos == exp_start;
        }

        let num_str = &self.input[start..self.pos];
        let span = Span::new(start, self.pos);
        let invalid = || Token::new(TokenKind::Error("invalid number literal".to_string()), span);

        if invalid_exponent {
            return invalid();
        }
        if is_float {
            num_str
                .parse::<f64>()
                .map_or_else(|_| invalid(), |n| Token::new(TokenKind::Float(n), span))
        } else {
            num_str
                .parse::<i64>()
                .map_or_else(|_| invalid(), |n| Token::new(TokenKind::Integer(n), span))
        }
    }

    fn scan_identifier_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while self.peek(0).is_some_and(is_ident_continue) {
            self.advance(1);
        }

        let ident = &self.input[start..self.pos];
        let span = Span::new(start, self.pos);

        match Keyword::parse(ident) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), span),
            None => Token::new(TokenKind::Identifier(ident.to_string()), span),
        }
    }

    fn scan_operator_or_punctuation(&mut self) -> Token {
        let start = self.pos;

        for (op, kind) in [
            ("<>", TokenKind::Neq),
            ("!=", TokenKind::Neq),
            ("<=", TokenKind::LtEq),
            (">=", TokenKind::GtEq),
        ] {
            if self.starts_with(op) {
                self.pos += 2;
                return Token::new(kind, Span::new(start, self.pos));
            }
        }

        let Some(ch) = self.peek(0) else {
            return Token::new(TokenKind::Eof, Span::at(start));
        };
        self.advance(1);
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '=' => TokenKind::Eq,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            _ => TokenKind::Error(format!("unexpected character '{ch}'")),
        };

        Token::new(kind, Span::new(start, self.pos))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_returned {
            return None;
        }

        let token = self.scan_token();
        if token.is_eof() {
            self.eof_returned = true;
        }
        Some(token)
    }
}

/// Returns true if the character can start an identifier.
fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

/// Returns true if the character can continue an identifier.
fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
        assert_eq!(lex("  \n\t  "), vec![TokenKind::Eof]);
        assert_eq!(lex("-- only a comment"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            lex("select FROM WhErE"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            lex(r#"SiteID "Site Name" [Start Date] "a""b""#),
            vec![
                TokenKind::Identifier("SiteID".to_string()),
                TokenKind::QuotedIdentifier("Site Name".to_string()),
                TokenKind::QuotedIdentifier("Start Date".to_string()),
                TokenKind::QuotedIdentifier("a\"b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            lex("42 3.5 1e3 'it''s' #2009-03-01#"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(3.5),
                TokenKind::Float(1000.0),
                TokenKind::String("it's".to_string()),
                TokenKind::Date("2009-03-01".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("= <> != < <= > >= - + * , ;"),
            vec![
                TokenKind::Eq,
                TokenKind::Neq,
                TokenKind::Neq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Asterisk,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens: Vec<_> = Lexer::new("SELECT  Depth").collect();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(8, 13));
        assert_eq!(tokens[2].span, Span::at(13));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(lex("'open")[0], TokenKind::Error(_)));
        assert!(matches!(lex("[open")[0], TokenKind::Error(_)));
        assert!(matches!(lex("/* open")[0], TokenKind::Error(_)));
        assert!(matches!(lex("1e")[0], TokenKind::Error(_)));
        assert!(matches!(lex("@")[0], TokenKind::Error(_)));
    }
}
