//! SQL parsing module.
//!
//! A handwritten lexer and recursive descent parser for the query subset
//! accepted by sessions:
//!
//! ```text
//! SELECT (* | column {, column}) FROM table
//!   [WHERE column op literal | column LIKE 'pattern' | column IS [NOT] NULL] [;]
//! ```
//!
//! Identifiers may be bare, `"double quoted"` or `[bracketed]`.

mod ast;
mod error;
mod lexer;
mod parser;
mod token;

pub use ast::*;
pub use error::{Span, SyntaxError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Keyword, Token, TokenKind};

/// Parses a query string.
pub fn parse(text: &str) -> Result<SelectStmt, SyntaxError> {
    Parser::new(text).parse()
}
