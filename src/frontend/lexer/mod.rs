mod cursor;
mod keywords;
mod lexer;
mod token;

pub use cursor::{CharacterCursor, ReadCursor, StrCursor};
pub use keywords::Keywords;
pub use lexer::{Lexer, Tokens};
pub use token::{Literal, Token, TokenKind};
