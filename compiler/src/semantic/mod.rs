//! Semantic analysis: name resolution, type checking, and capture discovery.
//!
//! A single pass over the AST does three jobs at once:
//!
//! - resolves every name against a scope stack ([`symbol_table`]), which
//!   doubles as the mechanism that discovers nested-function captures
//!   (spec §4.4) as a side effect of ordinary lookup;
//! - type-checks every expression and statement ([`typecheck_expr`],
//!   [`typecheck_stmt`]), annotating each `Expr` in place so codegen never
//!   has to re-derive a type;
//! - checks that `exit` only appears inside a `void` function and that
//!   every path through a non-`void` function reaches a `return`.
//!
//! There is no error recovery: analysis stops at the first error, matching
//! the lexer and parser's policy, since Tony programs are small enough that
//! fixing one error at a time is not a burden and a partially-annotated
//! tree would only complicate codegen.

mod error;
mod symbol_table;
mod typecheck_expr;
mod typecheck_stmt;

#[cfg(test)]
mod tests;

pub use error::{SemanticError, SemanticErrorKind};

use crate::ast::{Def, FormalType, FuncDef, Header, Program, Type};
use crate::token::Span;
use symbol_table::SymbolTable;

pub struct SemanticAnalyzer {
    symbols: SymbolTable,
}

/// The runtime library's signatures (spec §6), pre-registered in a scope
/// opened before `main`'s own so every Tony program can call them without
/// ever declaring them. None of their parameters are captured or passed by
/// reference; array parameters are already pointer-shaped.
fn runtime_prelude_signatures() -> Vec<(&'static str, Type)> {
    fn func(return_type: Type, params: &[(&'static str, Type)]) -> Type {
        Type::Function {
            return_type: Box::new(return_type),
            params: params
                .iter()
                .map(|(name, ty)| FormalType {
                    name: name.to_string(),
                    ty: ty.clone(),
                    by_ref: false,
                })
                .collect(),
        }
    }

    let char_buf = || Type::array_of(Type::Char);

    vec![
        ("puti", func(Type::Void, &[("n", Type::Int)])),
        ("putb", func(Type::Void, &[("b", Type::Bool)])),
        ("putc", func(Type::Void, &[("c", Type::Char)])),
        ("puts", func(Type::Void, &[("s", char_buf())])),
        ("geti", func(Type::Int, &[])),
        ("getb", func(Type::Bool, &[])),
        ("getc", func(Type::Char, &[])),
        ("gets", func(Type::Void, &[("n", Type::Int), ("s", char_buf())])),
        ("abs", func(Type::Int, &[("n", Type::Int)])),
        ("ord", func(Type::Int, &[("c", Type::Char)])),
        ("chr", func(Type::Char, &[("n", Type::Int)])),
        ("strlen", func(Type::Int, &[("s", char_buf())])),
        ("strcmp", func(Type::Int, &[("s1", char_buf()), ("s2", char_buf())])),
        ("strcpy", func(Type::Void, &[("trg", char_buf()), ("src", char_buf())])),
        ("strcat", func(Type::Void, &[("trg", char_buf()), ("src", char_buf())])),
    ]
}

/// Runs semantic analysis over a parsed program, annotating its AST in
/// place. On success every `Expr` carries a resolved type and every
/// `Header` carries its final (possibly capture-extended) parameter list.
pub fn analyze(program: &Program) -> Result<(), SemanticError> {
    let mut analyzer = SemanticAnalyzer {
        symbols: SymbolTable::new(),
    };
    analyzer.symbols.push_scope("<runtime>");
    for (name, ty) in runtime_prelude_signatures() {
        analyzer.symbols.define_func(name, ty, Span::dummy())?;
    }
    analyzer.analyze_main(&program.main)
}

/// Builds the `Type::Function` signature a header would be registered
/// under, so nested definitions can be declared before their bodies are
/// walked (this is what makes mutual and self recursion work).
fn header_signature(header: &Header) -> Type {
    Type::Function {
        return_type: Box::new(header.return_type.clone()),
        params: header
            .params
            .iter()
            .map(|p| crate::ast::FormalType {
                name: p.name.clone(),
                ty: p.ty.clone(),
                by_ref: p.by_ref,
            })
            .collect(),
    }
}

impl SemanticAnalyzer {
    /// Analyzes the program's root function. Unlike a nested definition,
    /// `main` is never registered as callable in any enclosing scope: Tony
    /// programs have no scope outside it.
    fn analyze_main(&mut self, main: &FuncDef) -> Result<(), SemanticError> {
        self.analyze_funcdef(main)
    }

    /// Analyzes one function body: pushes its scope, defines its formals,
    /// walks its locals and statements in textual order, checks that
    /// non-`void` functions return on every path, then closes the scope and
    /// records the resulting capture set back onto the header.
    fn analyze_funcdef(&mut self, func: &FuncDef) -> Result<(), SemanticError> {
        self.symbols.push_scope(func.header.name.clone());

        for param in &func.header.params {
            self.symbols
                .define_var(&param.name, param.ty.clone(), param.by_ref, param.span)?;
        }

        for local in &func.locals {
            self.analyze_local(local)?;
        }

        for stmt in &func.body {
            self.analyze_stmt(stmt, &func.header)?;
        }

        if func.header.return_type != Type::Void && !stmts_return(&func.body) {
            return Err(SemanticError::new(
                SemanticErrorKind::ControlFlow,
                format!(
                    "function '{}' does not return a value on every path",
                    func.header.name
                ),
                func.header.span,
            ));
        }

        let closed = self.symbols.pop_scope(func.span)?;
        func.header.set_extra_params(closed.captures);
        Ok(())
    }

    fn analyze_local(&mut self, local: &Def) -> Result<(), SemanticError> {
        match local {
            Def::Var(var_def) => {
                for name in &var_def.names {
                    self.symbols
                        .define_var(name, var_def.ty.clone(), false, var_def.span)?;
                }
                Ok(())
            }
            Def::Decl(decl) => {
                let sig = header_signature(&decl.header);
                self.symbols.declare_func(&decl.header.name, sig, decl.header.span)
            }
            Def::Func(nested) => {
                let sig = header_signature(&nested.header);
                self.symbols
                    .define_func(&nested.header.name, sig, nested.header.span)?;
                self.analyze_funcdef(nested)
            }
        }
    }
}

/// A block of statements returns on every path if any one of its statements
/// unconditionally terminates (an unreachable statement after it is not our
/// concern here; the front-end does not flag dead code).
fn stmts_return(stmts: &[crate::ast::Stmt]) -> bool {
    stmts.iter().any(stmt_always_returns)
}

fn stmt_always_returns(stmt: &crate::ast::Stmt) -> bool {
    use crate::ast::StmtKind;
    match &stmt.kind {
        StmtKind::Return(_) => true,
        // `exit` is an early void return, so control never falls off the
        // end of the function after it.
        StmtKind::Exit => true,
        StmtKind::If { arms, else_body } => match else_body {
            Some(else_body) => {
                arms.iter().all(|arm| stmts_return(&arm.body)) && stmts_return(else_body)
            }
            // No `else` means the condition could be false and nothing
            // runs, so an `if` alone never guarantees a return.
            None => false,
        },
        // A `for` may run zero iterations, so it never guarantees a return.
        StmtKind::For { .. } => false,
        StmtKind::Skip | StmtKind::Assign { .. } | StmtKind::Call(_) => false,
    }
}
