use super::super::errs::{Error, ErrorKind, ParseResult};
use super::super::options::Options;
use super::cursor::{CharStream, CharacterCursor};
use super::keywords::Keywords;
use super::token::{Literal, Token, TokenKind};

/// Significant digits kept when building a float. A u64 holds 19 of them,
/// more than an f64 can tell apart; later digits are consumed but dropped.
const MAX_SIGNIFICANT_DIGITS: usize = 19;

/// Powers of ten are clamped to this; anything bigger over- or underflows
/// an f32 either way.
const MAX_EXPONENT: i32 = 400;

pub struct Lexer<C> {
    chars: CharStream<C>,
    keywords: Keywords,
    options: Options,

    current: Token, // last consumed token
    peek: Token,    // first unconsumed token
    // Set when lexing `peek` failed. Sticks around, since nothing
    // after it can be trusted.
    peek_error: Option<Error>,

    // Whether the next token lexed will be the first on its line
    line_start: bool,
}

fn is_digit_char(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn digit_value(ch: char) -> i64 {
    i64::from(ch as u8 - b'0')
}

impl<C: CharacterCursor> Lexer<C> {
    /// Creates a lexer for OBJ keywords with the default options
    pub fn new(source: C) -> Self {
        Lexer::with_options(source, Keywords::obj(), Options::default())
    }

    pub fn with_options(source: C, keywords: Keywords, options: Options) -> Self {
        let mut lexer = Lexer {
            chars: CharStream::new(source),
            keywords,
            options,
            current: Token::placeholder(),
            peek: Token::placeholder(),
            peek_error: None,
            line_start: true,
        };

        // "Prime the pump", so that peek holds a real token. Current keeps
        // the placeholder until the first advance.
        lexer.fill_peek();
        lexer
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// The most recently consumed token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// The next token, without consuming it. Fails if that token could not
    /// be lexed.
    pub fn peek(&self) -> ParseResult<&Token> {
        match &self.peek_error {
            Some(e) => Err(e.clone()),
            None => Ok(&self.peek),
        }
    }

    /// Consumes the next token and returns it. Once the input is
    /// exhausted, this keeps returning EndOfFile.
    pub fn advance(&mut self) -> ParseResult<&Token> {
        if let Some(e) = &self.peek_error {
            return Err(e.clone());
        }

        // No-clone trick: swap peek into current, then lex over the old
        // current so its lexeme buffer gets reused
        std::mem::swap(&mut self.current, &mut self.peek);
        self.fill_peek();

        #[cfg(feature = "trace-tokens")]
        tracing::trace!(token = %self.current, position = %self.current.position, "advance");

        Ok(&self.current)
    }

    /// Returns an iterator over every token, up to and including EndOfFile
    /// or the first error.
    pub fn tokens(self) -> Tokens<C> {
        Tokens {
            lexer: self,
            finished: false,
        }
    }

    // ---- lexing ----

    fn fill_peek(&mut self) {
        // Skip the bodies of statements we don't handle
        let skip_unknown = self.options.skip_unknown_statements
            && self.current.kind == TokenKind::String
            && self.current.starts_statement;
        if self.current.kind.skips_line() || skip_unknown {
            tracing::debug!(
                keyword = %self.current.lexeme,
                line = self.current.position.line_no,
                "skipping statement"
            );
            self.chars.skip_line();
            self.line_start = true;
        }

        let mut token = std::mem::replace(&mut self.peek, Token::placeholder());
        match self.lex_token(&mut token) {
            Ok(()) => self.peek = token,
            Err(e) => {
                token.kind = TokenKind::Error;
                token.position = e.position;
                self.peek = token;
                self.peek_error = Some(e);
            }
        }
    }

    /// Lexes the next token into `token`.
    fn lex_token(&mut self, token: &mut Token) -> ParseResult<()> {
        loop {
            let ch = self.chars.take();
            let position = self.chars.get_position();
            token.reset(TokenKind::Error, position, self.line_start);

            let ch = match ch {
                Some(ch) => ch,
                None => {
                    token.kind = TokenKind::EndOfFile;
                    return Ok(());
                }
            };

            let kind = match ch {
                ' ' | '\t' | '\r' => continue,
                '\n' => TokenKind::EndOfStatement,
                '#' => {
                    // Comments run to the end of the line, and end the statement
                    self.chars.skip_line();
                    TokenKind::EndOfStatement
                }
                '/' => TokenKind::Separator,
                '+' | '-' | '.' => self.lex_number(ch, token)?,
                _ if is_digit_char(ch) => self.lex_number(ch, token)?,
                _ if is_identifier_char(ch) => self.lex_identifier_or_kw(ch, token),
                _ => return Err(Error::new(ErrorKind::UnexpectedCharacter(ch), position)),
            };

            token.kind = kind;
            self.line_start = kind == TokenKind::EndOfStatement;
            return Ok(());
        }
    }

    /// Lexes an integer or float literal. `first` is the character we
    /// already consumed: a digit, a sign, or the decimal point.
    fn lex_number(&mut self, first: char, token: &mut Token) -> ParseResult<TokenKind> {
        let position = self.chars.get_position();
        let negative = first == '-';
        let mut is_float = false;
        let mut digits = 0;

        // Integer part. It's kept exact, on the side of its sign, in case
        // the literal ends up an integer. None once it overflows.
        let mut integer = Some(0i64);
        let mut decimal = Decimal::default();
        if first != '.' {
            let mut next = Some(first)
                .filter(|&ch| is_digit_char(ch))
                .or_else(|| self.chars.take_if(is_digit_char));
            while let Some(ch) = next {
                let digit = digit_value(ch);
                integer = integer.and_then(|i| i.checked_mul(10)).and_then(|i| {
                    if negative {
                        i.checked_sub(digit)
                    } else {
                        i.checked_add(digit)
                    }
                });
                decimal.push_integer_digit(digit as u64);
                digits += 1;
                next = self.chars.take_if(is_digit_char);
            }
        }

        // Fractional part
        if first == '.' || self.chars.take_if(|ch| ch == '.').is_some() {
            is_float = true;
            while let Some(ch) = self.chars.take_if(is_digit_char) {
                decimal.push_fraction_digit(digit_value(ch) as u64);
                digits += 1;
            }
        }

        if digits == 0 {
            return Err(Error::new(ErrorKind::MissingDigits, position));
        }

        // Exponent
        let mut exponent = 0;
        if self.chars.take_if(|ch| ch == 'e' || ch == 'E').is_some() {
            is_float = true;
            exponent = self.lex_exponent()?;
        }

        if is_float {
            // Apply the sign last, so that it covers the fraction too (-0.5)
            let value = decimal.to_f64(exponent);
            let value = if negative { -value } else { value };
            token.value = Literal::Float(value as f32);
            Ok(TokenKind::Float)
        } else {
            let integer =
                integer.ok_or_else(|| Error::new(ErrorKind::IntegerOverflow, position))?;
            token.value = Literal::Integer(integer);
            Ok(TokenKind::Integer)
        }
    }

    /// Reads the signed integer after an exponent marker.
    fn lex_exponent(&mut self) -> ParseResult<i32> {
        let position = self.chars.get_position();
        let negative = self.chars.take_if(|ch| ch == '+' || ch == '-') == Some('-');

        let mut exponent: i32 = 0;
        let mut digits = 0;
        while let Some(ch) = self.chars.take_if(is_digit_char) {
            exponent = exponent
                .saturating_mul(10)
                .saturating_add(digit_value(ch) as i32);
            digits += 1;
        }

        if digits == 0 {
            return Err(Error::new(ErrorKind::MissingExponent, position));
        }

        Ok(if negative { -exponent } else { exponent })
    }

    /// Scans up to the end of the word, and returns the token kind for it.
    fn lex_identifier_or_kw(&mut self, first: char, token: &mut Token) -> TokenKind {
        token.lexeme.push(first);
        while let Some(ch) = self.chars.take_if(is_identifier_char) {
            token.lexeme.push(ch);
        }

        self.keywords
            .lookup(&token.lexeme)
            .unwrap_or(TokenKind::String)
    }
}

/// The digits of a float literal, as `mantissa * 10^exponent`. Leading
/// zeros only move the exponent, so tiny fractions keep all their
/// significant digits.
#[derive(Debug, Default)]
struct Decimal {
    mantissa: u64,
    exponent: i32,
    significant: usize,
}

impl Decimal {
    fn push_integer_digit(&mut self, digit: u64) {
        if !self.fold(digit) {
            self.exponent = self.exponent.saturating_add(1);
        }
    }

    fn push_fraction_digit(&mut self, digit: u64) {
        if self.fold(digit) {
            self.exponent = self.exponent.saturating_sub(1);
        }
    }

    /// Appends a digit to the mantissa, unless it's already full.
    fn fold(&mut self, digit: u64) -> bool {
        if self.significant >= MAX_SIGNIFICANT_DIGITS {
            return false;
        }

        self.mantissa = self.mantissa * 10 + digit;
        if self.mantissa != 0 {
            self.significant += 1;
        }
        true
    }

    fn to_f64(&self, exponent: i32) -> f64 {
        let exponent = self
            .exponent
            .saturating_add(exponent)
            .clamp(-MAX_EXPONENT, MAX_EXPONENT);
        scale_by_power_of_ten(self.mantissa as f64, exponent)
    }
}

fn scale_by_power_of_ten(mantissa: f64, exponent: i32) -> f64 {
    if mantissa == 0.0 {
        return mantissa;
    }

    // Dividing by an exact power of ten rounds better than multiplying by
    // an inexact negative one
    if exponent >= 0 {
        mantissa * 10f64.powi(exponent)
    } else {
        mantissa / 10f64.powi(-exponent)
    }
}

pub struct Tokens<C> {
    lexer: Lexer<C>,
    finished: bool,
}

impl<C: CharacterCursor> Iterator for Tokens<C> {
    type Item = ParseResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.lexer.advance().map(Token::clone);
        self.finished = match &result {
            Ok(token) => token.kind == TokenKind::EndOfFile,
            Err(_) => true,
        };

        Some(result)
    }
}
