//! Syntax error type.

use crate::token::{Span, TokenKind};
use std::fmt;

/// A parser error: the first unexpected token halts parsing immediately —
/// there is no error recovery (spec §4.2).
#[derive(Debug, Clone)]
pub struct SyntaxError {
    message: String,
    span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        SyntaxError {
            message: message.into(),
            span,
        }
    }

    pub fn unexpected(found: &TokenKind, expected: &str, span: Span) -> Self {
        SyntaxError::new(
            format!("expected {}, found {}", expected, describe(found)),
            span,
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// Renders a token kind the way it would appear as the offending lexeme in
/// a diagnostic message.
pub fn describe(kind: &TokenKind) -> String {
    use TokenKind::*;
    match kind {
        Identifier(name) => format!("identifier '{}'", name),
        IntLiteral(v) => format!("integer literal '{}'", v),
        CharLiteral(c) => format!("character literal '{}'", *c as char),
        StringLiteral(_) => "string literal".to_string(),
        Eof => "end of input".to_string(),
        other => format!("'{:?}'", other),
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}:{}: {}", self.span.line, self.span.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}
