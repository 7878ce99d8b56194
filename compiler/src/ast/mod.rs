//! Abstract syntax tree for the Tony programming language.
//!
//! Every node family is a plain tagged enum dispatched with `match` rather
//! than a class hierarchy with per-node `sem`/`codegen` methods: [`Expr`],
//! [`Stmt`], and [`Def`] are produced by [`crate::parser`], annotated in
//! place by [`crate::semantic`], and consumed by [`crate::codegen`].
//!
//! - [`types`] — the `Type` language (base types, arrays, lists, function
//!   signatures)
//! - [`expr`] — expressions, each carrying a semantic-analysis-filled
//!   resolved type
//! - [`stmt`] — statements
//! - [`def`] — variable definitions, function declarations/definitions, and
//!   the program root
//! - [`printer`] — pretty-printing (`tonyc --ast`)

mod def;
mod expr;
mod printer;
mod stmt;
mod types;

pub use def::{Def, FuncDecl, FuncDef, Header, Param, Program, VarDef};
pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use printer::print_program;
pub use stmt::{IfArm, SimpleStmt, Stmt, StmtKind};
pub use types::{FormalType, Type};
