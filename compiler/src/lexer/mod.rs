//! Lexical analyzer for the Tony programming language.
//!
//! Converts a UTF-8 source string into a stream of [`Token`]s, tracking line
//! and column numbers for diagnostics. Recognizes the keyword table, integer,
//! character and string literals (with an explicit escape table), operators
//! and punctuation, single-line `% …` comments and nested `<* … *>` block
//! comments.
//!
//! # Module Structure
//!
//! - [`error`] — error types for lexical analysis
//! - `tests` — unit tests (test-only)

mod error;

#[cfg(test)]
mod tests;

pub use error::{LexError, LexErrorKind};

use crate::token::{Span, Token, TokenKind, keyword_for};

/// A lexical analyzer over Tony source code.
///
/// Operates on raw bytes rather than `char`s: Tony's lexical grammar
/// (identifiers, keywords, operators, literals) is entirely ASCII, so
/// byte-indexing avoids UTF-8 boundary bookkeeping while still reporting
/// accurate line/column positions. Any non-ASCII byte outside of a string or
/// comment is rejected as an illegal character.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the entire input, returning a vector that always ends with
    /// [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let (line, column) = (self.line, self.column);

            let Some(c) = self.current() else {
                tokens.push(Token::new(TokenKind::Eof, Span::new(start, start, line, column)));
                return Ok(tokens);
            };

            let kind = if is_ident_start(c) {
                self.scan_identifier()
            } else if c.is_ascii_digit() {
                self.scan_number(line, column)?
            } else if c == b'\'' {
                self.scan_char_literal(line, column)?
            } else if c == b'"' {
                self.scan_string_literal(line, column)?
            } else {
                self.scan_operator(line, column)?
            };

            let span = Span::new(start, self.pos, line, column);
            tokens.push(Token::new(kind, span));
        }
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.current()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        Span::new(self.pos, self.pos, self.line, self.column)
    }

    /// Skips whitespace, single-line `%` comments, and nested `<* … *>`
    /// block comments, in any interleaving, until real content or EOF.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.current() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'%') => {
                    while let Some(c) = self.current() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'<') if self.peek(1) == Some(b'*') => {
                    self.skip_block_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_span = self.here();
        self.advance(); // '<'
        self.advance(); // '*'
        let mut depth = 1usize;
        while depth > 0 {
            match self.current() {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedBlockComment,
                        "block comment opened here is never closed",
                        start_span,
                    ));
                }
                Some(b'<') if self.peek(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                Some(b'*') if self.peek(1) == Some(b'>') => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.current() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .expect("identifier bytes are ASCII")
            .to_string();
        keyword_for(&text).unwrap_or(TokenKind::Identifier(text))
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        let text =
            std::str::from_utf8(&self.input[start..self.pos]).expect("digits are ASCII");
        text.parse::<i64>().map(TokenKind::IntLiteral).map_err(|_| {
            LexError::new(
                LexErrorKind::IntegerOverflow,
                format!("integer literal '{}' does not fit in a 64-bit signed integer", text),
                Span::new(start, self.pos, line, column),
            )
        })
    }

    fn scan_escape(&mut self, open_span: Span) -> Result<u8, LexError> {
        // Caller has already consumed the leading backslash.
        let esc_span = self.here();
        let Some(c) = self.advance() else {
            return Err(LexError::new(
                LexErrorKind::UnterminatedString,
                "literal opened here runs past end of input",
                open_span,
            ));
        };
        Ok(match c {
            b'n' => b'\n',
            b't' => b'\t',
            b'0' => 0u8,
            b'\\' => b'\\',
            b'\'' => b'\'',
            b'"' => b'"',
            b'x' => {
                let hi = self.advance().ok_or_else(|| {
                    LexError::new(
                        LexErrorKind::InvalidEscape,
                        "'\\x' escape requires two hex digits",
                        esc_span,
                    )
                })?;
                let lo = self.advance().ok_or_else(|| {
                    LexError::new(
                        LexErrorKind::InvalidEscape,
                        "'\\x' escape requires two hex digits",
                        esc_span,
                    )
                })?;
                let hex = [hi, lo];
                let text = std::str::from_utf8(&hex).map_err(|_| {
                    LexError::new(LexErrorKind::InvalidEscape, "invalid '\\x' escape", esc_span)
                })?;
                u8::from_str_radix(text, 16).map_err(|_| {
                    LexError::new(
                        LexErrorKind::InvalidEscape,
                        format!("'\\x{}' is not a valid hex escape", text),
                        esc_span,
                    )
                })?
            }
            other => {
                return Err(LexError::new(
                    LexErrorKind::InvalidEscape,
                    format!("unknown escape sequence '\\{}'", other as char),
                    esc_span,
                ));
            }
        })
    }

    fn scan_char_literal(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let open_span = Span::new(self.pos, self.pos, line, column);
        self.advance(); // opening quote
        let value = match self.current() {
            Some(b'\'') => {
                return Err(LexError::new(
                    LexErrorKind::EmptyCharLiteral,
                    "character literal must contain exactly one character",
                    open_span,
                ));
            }
            Some(b'\\') => {
                self.advance();
                self.scan_escape(open_span)?
            }
            Some(b'\n') | None => {
                return Err(LexError::new(
                    LexErrorKind::UnterminatedCharLiteral,
                    "character literal opened here is never closed",
                    open_span,
                ));
            }
            Some(c) => {
                self.advance();
                c
            }
        };
        match self.current() {
            Some(b'\'') => {
                self.advance();
                Ok(TokenKind::CharLiteral(value))
            }
            _ => Err(LexError::new(
                LexErrorKind::OverlongCharLiteral,
                "character literal must contain exactly one character",
                open_span,
            )),
        }
    }

    fn scan_string_literal(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let open_span = Span::new(self.pos, self.pos, line, column);
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.current() {
                None | Some(b'\n') => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        "string literal opened here is never closed",
                        open_span,
                    ));
                }
                Some(b'"') => {
                    self.advance();
                    return Ok(TokenKind::StringLiteral(bytes));
                }
                Some(b'\\') => {
                    self.advance();
                    bytes.push(self.scan_escape(open_span)?);
                }
                Some(c) => {
                    self.advance();
                    bytes.push(c);
                }
            }
        }
    }

    fn scan_operator(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let start_span = Span::new(self.pos, self.pos, line, column);
        let c = self.advance().expect("caller verified a current byte");
        let kind = match c {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'=' => TokenKind::Equal,
            b'#' => TokenKind::Hash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'<' => {
                if self.current() == Some(b'>') {
                    self.advance();
                    TokenKind::NotEqual
                } else if self.current() == Some(b'=') {
                    self.advance();
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                }
            }
            b'>' => {
                if self.current() == Some(b'=') {
                    self.advance();
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                }
            }
            b':' => {
                if self.current() == Some(b'=') {
                    self.advance();
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                }
            }
            other => {
                return Err(LexError::new(
                    LexErrorKind::IllegalCharacter,
                    format!("illegal character '{}'", other as char),
                    start_span,
                ));
            }
        };
        Ok(kind)
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'?'
}
