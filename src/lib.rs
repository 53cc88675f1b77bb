//! Streaming lexer and parser for Wavefront OBJ geometry.
//!
//! Characters are pulled from a [`CharacterCursor`], turned into tokens by
//! the [`Lexer`], and the [`Parser`] hands vertices, texture coordinates,
//! normals, parameters and faces to a [`GeometrySink`] as it reads them.

pub mod frontend;
pub mod geometry;

pub use frontend::{
    parse_str, CharacterCursor, Error, Lexer, Options, ParseResult, Parser, ReadCursor, StrCursor,
};
pub use geometry::{Event, GeometrySink, IndexTriplet, Statistics};
