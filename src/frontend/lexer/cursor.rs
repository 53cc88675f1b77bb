use super::super::span::CodePosition;
use std::io;
use std::str::Chars;

/// A source of characters. `None` marks the end of input, and must keep
/// being returned on every call after that.
pub trait CharacterCursor {
    fn next(&mut self) -> Option<char>;
}

impl<C: CharacterCursor + ?Sized> CharacterCursor for &mut C {
    fn next(&mut self) -> Option<char> {
        (**self).next()
    }
}

impl<C: CharacterCursor + ?Sized> CharacterCursor for Box<C> {
    fn next(&mut self) -> Option<char> {
        (**self).next()
    }
}

/// Character source over a borrowed string.
#[derive(Debug, Clone)]
pub struct StrCursor<'src> {
    chars: Chars<'src>,
}

impl<'src> StrCursor<'src> {
    pub fn new(source: &'src str) -> Self {
        StrCursor {
            chars: source.chars(),
        }
    }
}

impl<'src> CharacterCursor for StrCursor<'src> {
    fn next(&mut self) -> Option<char> {
        // Chars is fused, so it keeps returning None
        self.chars.next()
    }
}

/// Character source over any reader, one byte per character. OBJ files
/// are ASCII in practice; other bytes come through as Latin-1 and are
/// rejected by the lexer like any other stray character.
///
/// The first I/O error ends the input. It is kept around so the caller
/// can tell a truncated read from a real end of file.
pub struct ReadCursor<R> {
    bytes: io::Bytes<R>,
    error: Option<io::Error>,
    done: bool,
}

impl<R: io::Read> ReadCursor<R> {
    /// Wrap the reader in a `BufReader` first unless it already buffers.
    pub fn new(reader: R) -> Self {
        ReadCursor {
            bytes: reader.bytes(),
            error: None,
            done: false,
        }
    }

    /// Takes the I/O error that cut the input short, if there was one.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<R: io::Read> CharacterCursor for ReadCursor<R> {
    fn next(&mut self) -> Option<char> {
        if self.done {
            return None;
        }

        match self.bytes.next() {
            Some(Ok(byte)) => Some(char::from(byte)),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "read failed, treating as end of input");
                self.error = Some(e);
                self.done = true;
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// One-character lookahead over a `CharacterCursor`, keeping track of
/// where each character sits.
pub struct CharStream<C> {
    source: C,
    peeked: Option<char>,
    // Where the last consumed character sits, and the running counter
    // behind it
    current_pos: CodePosition,
    counter: CodePosition,
}

impl<C: CharacterCursor> CharStream<C> {
    pub fn new(mut source: C) -> Self {
        let peeked = source.next();
        CharStream {
            source,
            peeked,
            current_pos: CodePosition::dummy(),
            counter: CodePosition::new(1, 0),
        }
    }

    /// Position of the most recently consumed character. Once the input is
    /// exhausted, this is the column just past the last character.
    pub fn get_position(&self) -> CodePosition {
        self.current_pos
    }

    /// Consumes the next character, and returns it.
    pub fn take(&mut self) -> Option<char> {
        let taken = self.peeked;

        match taken {
            Some(ch) => {
                self.current_pos = self.counter.bump(ch);
                self.peeked = self.source.next();
            }
            None => {
                self.current_pos =
                    CodePosition::new(self.counter.line_no, self.counter.column_no + 1);
            }
        }

        taken
    }

    /// Consumes the next character only if it satisfies the condition.
    pub fn take_if<F>(&mut self, condition: F) -> Option<char>
    where
        F: Fn(char) -> bool,
    {
        match self.peeked {
            Some(ch) if condition(ch) => self.take(),
            _ => None,
        }
    }

    /// Reads up to and including the end of the current line.
    pub fn skip_line(&mut self) {
        while let Some(ch) = self.take() {
            if ch == '\n' {
                break;
            }
        }
    }
}
