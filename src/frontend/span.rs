use std::fmt;

/// Struct for tracking position in a character stream. Note that:
/// a) line numbers are 1-indexed, and so are columns of real characters
/// b) a newline belongs to the line it ends
/// c) the derived Ord traits work the way you expect
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct CodePosition {
    pub line_no: usize,
    pub column_no: usize,
}

impl CodePosition {
    pub fn new(line_no: usize, column_no: usize) -> Self {
        CodePosition { line_no, column_no }
    }

    /// Position used for tokens that were never lexed from real input.
    pub fn dummy() -> Self {
        CodePosition::new(0, 0)
    }

    /// Moves past the given character. Returns the position the character
    /// itself occupies.
    pub fn bump(&mut self, ch: char) -> CodePosition {
        self.column_no += 1;
        let here = *self;

        if ch == '\n' {
            self.line_no += 1;
            self.column_no = 0;
        }

        here
    }
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line_no, self.column_no)
    }
}
