//! Lexical error types.

use crate::token::Span;
use std::fmt;

/// The kind of lexical error encountered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    IllegalCharacter,
    UnterminatedString,
    UnterminatedCharLiteral,
    UnterminatedBlockComment,
    InvalidEscape,
    EmptyCharLiteral,
    OverlongCharLiteral,
    IntegerOverflow,
    StrayMinus,
}

/// A lexical error with a human-readable message and source span.
#[derive(Debug, Clone)]
pub struct LexError {
    kind: LexErrorKind,
    message: String,
    span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, message: impl Into<String>, span: Span) -> Self {
        LexError {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> LexErrorKind {
        self.kind.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn short_message(&self) -> &'static str {
        match self.kind {
            LexErrorKind::IllegalCharacter => "illegal character",
            LexErrorKind::UnterminatedString => "unterminated string literal",
            LexErrorKind::UnterminatedCharLiteral => "unterminated character literal",
            LexErrorKind::UnterminatedBlockComment => "unterminated block comment",
            LexErrorKind::InvalidEscape => "invalid escape sequence",
            LexErrorKind::EmptyCharLiteral => "empty character literal",
            LexErrorKind::OverlongCharLiteral => "character literal holds more than one character",
            LexErrorKind::IntegerOverflow => "integer literal out of range",
            LexErrorKind::StrayMinus => "unexpected character",
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.short_message(),
            self.span.line,
            self.span.column,
            self.message
        )
    }
}

impl std::error::Error for LexError {}
