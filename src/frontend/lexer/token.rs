use super::super::span::CodePosition;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    // Keywords
    Vertex,
    Texture,
    Normal,
    Parameter,
    Face,
    Object,
    Group,
    Material,
    UseMaterial,
    Smoothing,

    // Literals
    String,
    Integer,
    Float,

    // Punctuation
    Separator,

    // Miscellanous
    EndOfStatement,
    EndOfFile,
    Error,
}

/// Numeric payload of a literal token.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Literal {
    None,
    Integer(i64),
    Float(f32),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Spelling of identifiers and keywords, empty otherwise.
    pub lexeme: String,
    pub value: Literal,
    pub position: CodePosition,
    /// Whether this is the first token on its line.
    pub starts_statement: bool,
}

impl TokenKind {
    /// Statements whose bodies we don't look at. Once one of these has been
    /// consumed, the lexer throws away the rest of the line.
    pub fn skips_line(self) -> bool {
        matches!(
            self,
            TokenKind::Object
                | TokenKind::Group
                | TokenKind::Smoothing
                | TokenKind::Material
                | TokenKind::UseMaterial
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            TokenKind::Vertex => "'v'",
            TokenKind::Texture => "'vt'",
            TokenKind::Normal => "'vn'",
            TokenKind::Parameter => "'vp'",
            TokenKind::Face => "'f'",
            TokenKind::Object => "'o'",
            TokenKind::Group => "'g'",
            TokenKind::Material => "'mtllib'",
            TokenKind::UseMaterial => "'usemtl'",
            TokenKind::Smoothing => "'s'",
            TokenKind::String => "identifier",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Separator => "'/'",
            TokenKind::EndOfStatement => "end of line",
            TokenKind::EndOfFile => "end of file",
            TokenKind::Error => "invalid token",
        };
        f.write_str(s)
    }
}

impl Token {
    /// Placeholder occupying a token slot before anything has been lexed
    /// into it.
    pub fn placeholder() -> Self {
        Token {
            kind: TokenKind::Error,
            lexeme: String::new(),
            value: Literal::None,
            position: CodePosition::dummy(),
            starts_statement: false,
        }
    }

    /// Resets the token to `kind` at `position`, keeping the lexeme's
    /// allocation for reuse.
    pub fn reset(&mut self, kind: TokenKind, position: CodePosition, starts_statement: bool) {
        self.kind = kind;
        self.lexeme.clear();
        self.value = Literal::None;
        self.position = position;
        self.starts_statement = starts_statement;
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            Literal::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Value of a numeric literal as a float, widening integers.
    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            Literal::Integer(i) => Some(i as f32),
            Literal::Float(f) => Some(f),
            Literal::None => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.kind, self.value) {
            (TokenKind::Integer, Literal::Integer(i)) => write!(f, "Integer({})", i),
            (TokenKind::Float, Literal::Float(x)) => write!(f, "Float({})", x),
            (_, _) if !self.lexeme.is_empty() => write!(f, "{:?}({:?})", self.kind, self.lexeme),
            (_, _) => write!(f, "{:?}", self.kind),
        }
    }
}
