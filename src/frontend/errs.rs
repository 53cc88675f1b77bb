use super::lexer::TokenKind;
use super::span::CodePosition;
use std::fmt;
use thiserror::Error;

/// A fatal error. Nothing is recovered after one of these; the position is
/// where the offending character or token starts.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{position}: {kind}")]
pub struct Error {
    pub position: CodePosition,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexical errors
    #[error("Unexpected character '{}'", .0.escape_debug())]
    UnexpectedCharacter(char),
    #[error("Expect digits in number")]
    MissingDigits,
    #[error("Expect digits in exponent")]
    MissingExponent,
    #[error("Integer literal out of range")]
    IntegerOverflow,

    // Syntax errors
    #[error("Expect {expected} after {item}, got {found}")]
    ExpectedToken {
        expected: TokenKind,
        found: TokenKind,
        item: Item,
    },
    #[error("Expect {component} coordinate for {item}, got {found}")]
    MissingComponent {
        component: &'static str,
        item: Item,
        found: TokenKind,
    },
    #[error("Face needs at least two vertices, got {0}")]
    DegenerateFace(usize),
    #[error("Unknown statement '{0}'")]
    UnknownStatement(String),
    #[error("Expect statement, got {0}")]
    ExpectedStatement(TokenKind),
    #[error("Invalid token")]
    InvalidToken,
}

/// The kind of statement an error was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Vertex,
    Texture,
    Normal,
    Parameter,
    Face,
}

pub type ParseResult<T> = Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, position: CodePosition) -> Self {
        Error { position, kind }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn line(&self) -> usize {
        self.position.line_no
    }

    pub fn column(&self) -> usize {
        self.position.column_no
    }
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::UnexpectedCharacter(_)
            | ErrorKind::MissingDigits
            | ErrorKind::MissingExponent
            | ErrorKind::IntegerOverflow => Category::Lexical,
            ErrorKind::ExpectedToken { .. }
            | ErrorKind::MissingComponent { .. }
            | ErrorKind::DegenerateFace(_)
            | ErrorKind::UnknownStatement(_)
            | ErrorKind::ExpectedStatement(_)
            | ErrorKind::InvalidToken => Category::Syntax,
        }
    }
}

impl Item {
    pub fn as_str(&self) -> &'static str {
        match self {
            Item::Vertex => "vertex",
            Item::Texture => "texture coordinate",
            Item::Normal => "normal",
            Item::Parameter => "parameter",
            Item::Face => "face",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Category::Lexical => f.write_str("lexical error"),
            Category::Syntax => f.write_str("syntax error"),
        }
    }
}
