/// Knobs shared by the lexer and the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Treat missing mandatory coordinates and faces with fewer than two
    /// vertices as errors. When off, missing coordinates read as zero.
    pub strict: bool,
    /// Treat tokens left over after a complete statement, and numbers or
    /// separators at the start of a line, as errors. When off they are
    /// ignored.
    pub reject_trailing_tokens: bool,
    /// Skip the rest of a line that starts with an unrecognized word,
    /// instead of failing on it.
    pub skip_unknown_statements: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            strict: true,
            reject_trailing_tokens: false,
            skip_unknown_statements: true,
        }
    }
}

impl Options {
    /// Accepts whatever it can, like most OBJ loaders do.
    pub fn lenient() -> Self {
        Options {
            strict: false,
            ..Options::default()
        }
    }

    /// Rejects anything that isn't exactly one well-formed statement per
    /// line, apart from unknown statements.
    pub fn pedantic() -> Self {
        Options {
            reject_trailing_tokens: true,
            ..Options::default()
        }
    }
}
