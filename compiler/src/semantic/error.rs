//! Semantic analysis error types.

use crate::token::Span;
use std::fmt;

/// The kind of semantic error, matching the front-end's error taxonomy.
///
/// Kept as a separate tag from the message so callers that care (tests,
/// diagnostics) can match structurally instead of string-sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// A name was declared twice in the same scope, or a `decl` was never
    /// fulfilled by a matching definition.
    Declaration,
    /// A name was referenced but does not resolve in any enclosing scope.
    Name,
    /// An expression's type does not match what its context requires.
    Type,
    /// A call supplied the wrong number of arguments.
    Arity,
    /// `exit` outside a loop, or a non-`void` function with a path that
    /// does not return a value.
    ControlFlow,
}

/// An error raised during semantic analysis. Fatal: analysis stops at the
/// first one raised, matching the front-end's no-recovery policy.
#[derive(Debug)]
pub struct SemanticError {
    kind: SemanticErrorKind,
    message: String,
    span: Span,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, message: impl Into<String>, span: Span) -> Self {
        SemanticError {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> SemanticErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.span.line, self.span.column, self.message)
    }
}

impl std::error::Error for SemanticError {}
