use super::token::TokenKind;
use std::collections::HashMap;

/// Reserved words, mapped to the token kind they lex as.
#[derive(Debug, Clone)]
pub struct Keywords {
    table: HashMap<&'static str, TokenKind>,
}

const OBJ_KEYWORDS: &[(&str, TokenKind)] = &[
    ("v", TokenKind::Vertex),
    ("vt", TokenKind::Texture),
    ("vn", TokenKind::Normal),
    ("vp", TokenKind::Parameter),
    ("f", TokenKind::Face),
    ("o", TokenKind::Object),
    ("g", TokenKind::Group),
    ("mtllib", TokenKind::Material),
    ("usemtl", TokenKind::UseMaterial),
    ("s", TokenKind::Smoothing),
];

impl Keywords {
    /// The Wavefront OBJ statement keywords.
    pub fn obj() -> Self {
        OBJ_KEYWORDS.iter().copied().collect()
    }

    /// Resolves a spelling, or returns None for ordinary identifiers.
    pub fn lookup(&self, spelling: &str) -> Option<TokenKind> {
        self.table.get(spelling).copied()
    }
}

impl std::iter::FromIterator<(&'static str, TokenKind)> for Keywords {
    fn from_iter<I: IntoIterator<Item = (&'static str, TokenKind)>>(iter: I) -> Self {
        Keywords {
            table: iter.into_iter().collect(),
        }
    }
}
