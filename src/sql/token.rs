//! SQL token types.
//!
//! This module defines the [`Token`] type produced by the lexer for the
//! Access query subset: keywords, identifiers, literals and comparison
//! operators.

use super::error::Span;

/// A SQL token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The span of this token in the source.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an end-of-file token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// The kind of a SQL token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Unsigned integer literal (e.g., 42).
    Integer(i64),
    /// Unsigned floating-point literal (e.g., 3.14, 1.5e10).
    Float(f64),
    /// String literal (e.g., 'hello').
    String(String),
    /// Date literal between `#` signs (e.g., #2009-03-01#).
    Date(String),

    // Identifiers and keywords
    /// Unquoted identifier (e.g., SiteID).
    Identifier(String),
    /// Quoted identifier (e.g., "Site Name" or [Site Name]).
    QuotedIdentifier(String),

    // Keywords
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Asterisk,
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,

    // Punctuation
    /// ,
    Comma,
    /// ;
    Semicolon,

    /// Lexical error with a message.
    Error(String),

    /// End of file/input.
    Eof,
}

impl TokenKind {
    /// Returns the display name for error messages.
    pub fn display_name(&self) -> String {
        match self {
            TokenKind::Integer(n) => format!("integer '{n}'"),
            TokenKind::Float(n) => format!("float '{n}'"),
            TokenKind::String(s) => format!("string '{s}'"),
            TokenKind::Date(s) => format!("date '#{s}#'"),
            TokenKind::Identifier(s) => format!("identifier '{s}'"),
            TokenKind::QuotedIdentifier(s) => format!("identifier '[{s}]'"),
            TokenKind::Keyword(kw) => format!("keyword '{}'", kw.as_str()),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Asterisk => "'*'".to_string(),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::Neq => "'<>'".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::LtEq => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::GtEq => "'>='".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Error(msg) => msg.clone(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// SQL keywords.
///
/// Keywords are case-insensitive. Words not listed here lex as identifiers,
/// so column names such as `Date` or `Value` need no quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Where,
    Like,
    Is,
    Not,
    Null,
    True,
    False,
}

impl Keyword {
    /// Returns the string representation of this keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Like => "LIKE",
            Keyword::Is => "IS",
            Keyword::Not => "NOT",
            Keyword::Null => "NULL",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
        }
    }

    /// Attempts to parse a keyword from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Keyword::Select),
            "FROM" => Some(Keyword::From),
            "WHERE" => Some(Keyword::Where),
            "LIKE" => Some(Keyword::Like),
            "IS" => Some(Keyword::Is),
            "NOT" => Some(Keyword::Not),
            "NULL" => Some(Keyword::Null),
            "TRUE" => Some(Keyword::True),
            "FALSE" => Some(Keyword::False),
            _ => None,
        }
    }
}
