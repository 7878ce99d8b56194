//! Expression nodes for the Tony AST.

use std::cell::RefCell;

use super::types::Type;
use crate::token::Span;

/// A binary arithmetic, comparison, or boolean operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
    /// `e1 # e2` — cons onto a list.
    Cons,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

/// The kind of an expression, without source location or resolved type.
#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i64),
    CharLiteral(u8),
    BoolLiteral(bool),
    /// The empty list literal `nil`.
    NilLiteral,
    /// A string literal; implicitly null-terminated at codegen time.
    StringLiteral(Vec<u8>),
    Identifier(String),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `new T [e]`.
    New {
        elem_ty: Type,
        size: Box<Expr>,
    },
    Head(Box<Expr>),
    Tail(Box<Expr>),
    /// `nil?(e)`.
    IsNil(Box<Expr>),
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

/// An expression with source location and a semantic-analysis-populated
/// resolved type.
///
/// The resolved type is filled in by the semantic analyzer via interior
/// mutability (`set_ty`) rather than by rebuilding the tree into a second,
/// annotated structure — the analyzer borrows the tree immutably throughout
/// its single pass, and `resolved_ty` is the one place it writes back.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    resolved_ty: RefCell<Option<Type>>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr {
            kind,
            span,
            resolved_ty: RefCell::new(None),
        }
    }

    /// Records this expression's resolved type. Called exactly once per node
    /// by the semantic analyzer.
    pub fn set_ty(&self, ty: Type) {
        *self.resolved_ty.borrow_mut() = Some(ty);
    }

    /// Returns the resolved type. Panics if called before semantic analysis
    /// has annotated this node — codegen relies on this invariant instead of
    /// threading `Option` through every lowering call.
    pub fn ty(&self) -> Type {
        self.resolved_ty
            .borrow()
            .clone()
            .expect("expression type requested before semantic analysis annotated it")
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(self.kind, ExprKind::Identifier(_) | ExprKind::Index { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ty_panics_before_annotation() {
        let e = Expr::new(ExprKind::IntLiteral(1), Span::dummy());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| e.ty()));
        assert!(result.is_err());
    }

    #[test]
    fn set_ty_then_ty_roundtrips() {
        let e = Expr::new(ExprKind::IntLiteral(1), Span::dummy());
        e.set_ty(Type::Int);
        assert_eq!(e.ty(), Type::Int);
    }

    #[test]
    fn is_lvalue_identifies_identifiers_and_indices() {
        let id = Expr::new(ExprKind::Identifier("x".into()), Span::dummy());
        assert!(id.is_lvalue());
        let call = Expr::new(
            ExprKind::Call {
                callee: "f".into(),
                args: vec![],
            },
            Span::dummy(),
        );
        assert!(!call.is_lvalue());
    }
}
