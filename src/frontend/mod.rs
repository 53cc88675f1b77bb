mod errs;
mod lexer;
mod options;
mod parser;
mod span;

pub use errs::{Category, Error, ErrorKind, Item, ParseResult};
pub use lexer::{
    CharacterCursor, Keywords, Lexer, Literal, ReadCursor, StrCursor, Token, TokenKind, Tokens,
};
pub use options::Options;
pub use parser::Parser;
pub use span::CodePosition;

use crate::geometry::{GeometrySink, Statistics};

/// Convenience function to parse a whole string.
///
/// This is a shorthand for building a `Lexer` over a `StrCursor` and running
/// a `Parser` over it.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_str<S: GeometrySink>(
    source: &str,
    sink: S,
    options: Options,
) -> ParseResult<Statistics> {
    let lexer = Lexer::with_options(StrCursor::new(source), Keywords::obj(), options);
    let mut parser = Parser::new(lexer, sink);
    parser.parse()?;
    Ok(parser.statistics())
}
