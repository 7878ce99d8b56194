//! Statement nodes for the Tony AST.

use super::expr::Expr;
use crate::token::Span;

/// A "simple" statement: the only statement forms allowed in a `for`
/// loop's init/step lists (spec grammar: `simple-list`).
#[derive(Debug, Clone)]
pub enum SimpleStmt {
    Skip,
    Assign { target: Expr, value: Expr },
    Call(Expr),
}

/// One `if`/`elsif` arm: a guard and the statements to run when it holds.
#[derive(Debug, Clone)]
pub struct IfArm {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Skip,
    Assign {
        target: Expr,
        value: Expr,
    },
    Call(Expr),
    If {
        arms: Vec<IfArm>,
        else_body: Option<Vec<Stmt>>,
    },
    For {
        init: Vec<SimpleStmt>,
        condition: Expr,
        step: Vec<SimpleStmt>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Exit,
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}
