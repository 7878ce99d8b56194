//! Scope stack used by the semantic analyzer.
//!
//! Each function body gets one [`Scope`]. Lookups walk outward from the
//! innermost scope; a hit in an ancestor scope that names a variable or
//! parameter is recorded as a *capture* in every scope between the hit and
//! the lookup site (inclusive of the lookup site, exclusive of the scope
//! that owns the name). This is how nested-function capture is discovered:
//! no separate free-variable analysis pass is needed, the symbol table
//! accumulates it as a side effect of ordinary name resolution. A hit that
//! names a function is never a capture — calling a sibling or ancestor
//! function (mutual recursion, or simply invoking something declared
//! further out) needs no extra parameter, since the callee already has a
//! fixed address.
//!
//! A small `Vec` of `(name, symbol)` pairs is used instead of a hash map:
//! Tony scopes are small (a handful of locals and formals), and a `Vec`
//! preserves the declaration order `Header::extra_params` depends on.

use crate::ast::Type;

use super::error::{SemanticError, SemanticErrorKind};
use crate::token::Span;

/// A resolved name: either a variable/parameter binding or a function
/// signature.
#[derive(Debug, Clone)]
pub enum Symbol {
    Var { ty: Type, by_ref: bool },
    Func { ty: Type },
}

impl Symbol {
    pub fn ty(&self) -> &Type {
        match self {
            Symbol::Var { ty, .. } => ty,
            Symbol::Func { ty } => ty,
        }
    }

    pub fn is_func(&self) -> bool {
        matches!(self, Symbol::Func { .. })
    }
}

/// One function's scope: its own declarations plus the set of outer names
/// it (or something it calls) needs threaded in as extra by-reference
/// parameters.
struct Scope {
    func_name: String,
    entries: Vec<(String, Symbol)>,
    /// Forward-declared (`decl`) functions not yet fulfilled by a matching
    /// `def` in this scope, keyed by name.
    pending_decls: Vec<String>,
    /// Names captured from an ancestor scope, in first-use order.
    captures: Vec<String>,
}

impl Scope {
    fn new(func_name: impl Into<String>) -> Self {
        Scope {
            func_name: func_name.into(),
            entries: Vec::new(),
            pending_decls: Vec::new(),
            captures: Vec::new(),
        }
    }

    fn find(&self, name: &str) -> Option<&Symbol> {
        self.entries.iter().rev().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

pub struct SymbolTable {
    scopes: Vec<Scope>,
}

/// The result of closing a function's scope: its capture set, in the
/// order names were first referenced.
pub struct ClosedScope {
    pub func_name: String,
    pub captures: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { scopes: Vec::new() }
    }

    pub fn push_scope(&mut self, func_name: impl Into<String>) {
        self.scopes.push(Scope::new(func_name));
    }

    /// Closes the innermost scope. Returns an error if a `decl` in it was
    /// never fulfilled by a matching `def`.
    pub fn pop_scope(&mut self, span: Span) -> Result<ClosedScope, SemanticError> {
        let scope = self
            .scopes
            .pop()
            .expect("pop_scope called with no open scope");
        if let Some(name) = scope.pending_decls.first() {
            return Err(SemanticError::new(
                SemanticErrorKind::Declaration,
                format!("'{}' is declared but never defined in this scope", name),
                span,
            ));
        }
        Ok(ClosedScope {
            func_name: scope.func_name,
            captures: scope.captures,
        })
    }

    fn current(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("no open scope")
    }

    /// Defines a variable or parameter in the current scope.
    pub fn define_var(
        &mut self,
        name: &str,
        ty: Type,
        by_ref: bool,
        span: Span,
    ) -> Result<(), SemanticError> {
        let scope = self.current();
        if scope.find(name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::Declaration,
                format!("'{}' is already declared in this scope", name),
                span,
            ));
        }
        scope.entries.push((name.to_string(), Symbol::Var { ty, by_ref }));
        Ok(())
    }

    /// Registers a forward declaration (`decl header`).
    pub fn declare_func(&mut self, name: &str, ty: Type, span: Span) -> Result<(), SemanticError> {
        let scope = self.current();
        if scope.find(name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::Declaration,
                format!("'{}' is already declared in this scope", name),
                span,
            ));
        }
        scope.entries.push((name.to_string(), Symbol::Func { ty }));
        scope.pending_decls.push(name.to_string());
        Ok(())
    }

    /// Registers a function definition, fulfilling a pending `decl` with a
    /// matching signature if one exists, or introducing a fresh binding.
    pub fn define_func(&mut self, name: &str, ty: Type, span: Span) -> Result<(), SemanticError> {
        let scope = self.current();
        if let Some(idx) = scope.pending_decls.iter().position(|n| n == name) {
            let existing_ty = scope.find(name).expect("pending decl has an entry").ty().clone();
            if existing_ty != ty {
                return Err(SemanticError::new(
                    SemanticErrorKind::Declaration,
                    format!(
                        "definition of '{}' does not match its earlier declaration",
                        name
                    ),
                    span,
                ));
            }
            scope.pending_decls.remove(idx);
            return Ok(());
        }
        if scope.find(name).is_some() {
            return Err(SemanticError::new(
                SemanticErrorKind::Declaration,
                format!("'{}' is already declared in this scope", name),
                span,
            ));
        }
        scope.entries.push((name.to_string(), Symbol::Func { ty }));
        Ok(())
    }

    /// Looks up a name, searching outward from the innermost scope.
    /// A hit above the innermost scope registers a capture in every scope
    /// strictly between the owning scope and the lookup site, but only when
    /// the name resolves to a variable or parameter: a function called
    /// across a scope boundary (e.g. mutual recursion) is resolved, not
    /// captured — it already has a stable, callable address and needs no
    /// extra by-reference parameter threaded in.
    pub fn lookup(&mut self, name: &str, span: Span) -> Result<Symbol, SemanticError> {
        let lookup_idx = self.scopes.len().checked_sub(1);
        let Some(lookup_idx) = lookup_idx else {
            return Err(SemanticError::new(
                SemanticErrorKind::Name,
                format!("'{}' is not defined", name),
                span,
            ));
        };

        let mut found_idx = None;
        for i in (0..=lookup_idx).rev() {
            if self.scopes[i].find(name).is_some() {
                found_idx = Some(i);
                break;
            }
        }

        let Some(found_idx) = found_idx else {
            return Err(SemanticError::new(
                SemanticErrorKind::Name,
                format!("'{}' is not defined", name),
                span,
            ));
        };

        let symbol = self.scopes[found_idx].find(name).expect("checked above").clone();

        if matches!(symbol, Symbol::Var { .. }) {
            for scope in &mut self.scopes[found_idx + 1..=lookup_idx] {
                if !scope.captures.iter().any(|c| c == name) {
                    scope.captures.push(name.to_string());
                }
            }
        }

        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_and_looks_up_in_same_scope() {
        let mut table = SymbolTable::new();
        table.push_scope("main");
        table.define_var("x", Type::Int, false, Span::dummy()).unwrap();
        let sym = table.lookup("x", Span::dummy()).unwrap();
        assert_eq!(*sym.ty(), Type::Int);
    }

    #[test]
    fn rejects_duplicate_definition() {
        let mut table = SymbolTable::new();
        table.push_scope("main");
        table.define_var("x", Type::Int, false, Span::dummy()).unwrap();
        let err = table.define_var("x", Type::Bool, false, Span::dummy()).unwrap_err();
        assert_eq!(err.kind(), SemanticErrorKind::Declaration);
    }

    #[test]
    fn rejects_undefined_name() {
        let mut table = SymbolTable::new();
        table.push_scope("main");
        let err = table.lookup("missing", Span::dummy()).unwrap_err();
        assert_eq!(err.kind(), SemanticErrorKind::Name);
    }

    #[test]
    fn lookup_across_scopes_registers_capture() {
        let mut table = SymbolTable::new();
        table.push_scope("outer");
        table.define_var("x", Type::Int, false, Span::dummy()).unwrap();
        table.push_scope("inner");
        table.lookup("x", Span::dummy()).unwrap();
        let closed = table.pop_scope(Span::dummy()).unwrap();
        assert_eq!(closed.captures, vec!["x".to_string()]);
    }

    #[test]
    fn capture_threads_through_every_intermediate_scope() {
        let mut table = SymbolTable::new();
        table.push_scope("outer");
        table.define_var("x", Type::Int, false, Span::dummy()).unwrap();
        table.push_scope("middle");
        table.push_scope("inner");
        table.lookup("x", Span::dummy()).unwrap();
        let inner_closed = table.pop_scope(Span::dummy()).unwrap();
        let middle_closed = table.pop_scope(Span::dummy()).unwrap();
        assert_eq!(inner_closed.captures, vec!["x".to_string()]);
        assert_eq!(middle_closed.captures, vec!["x".to_string()]);
    }

    #[test]
    fn looking_up_a_function_across_scopes_does_not_register_a_capture() {
        let mut table = SymbolTable::new();
        table.push_scope("outer");
        let sig = Type::Function {
            return_type: Box::new(Type::Void),
            params: vec![],
        };
        table.define_func("helper", sig, Span::dummy()).unwrap();
        table.push_scope("inner");
        table.lookup("helper", Span::dummy()).unwrap();
        let closed = table.pop_scope(Span::dummy()).unwrap();
        assert!(closed.captures.is_empty());
    }

    #[test]
    fn pending_decl_without_definition_fails_on_scope_close() {
        let mut table = SymbolTable::new();
        table.push_scope("main");
        table
            .declare_func(
                "helper",
                Type::Function {
                    return_type: Box::new(Type::Void),
                    params: vec![],
                },
                Span::dummy(),
            )
            .unwrap();
        let err = table.pop_scope(Span::dummy()).unwrap_err();
        assert_eq!(err.kind(), SemanticErrorKind::Declaration);
    }

    #[test]
    fn matching_definition_fulfills_pending_decl() {
        let mut table = SymbolTable::new();
        table.push_scope("main");
        let sig = Type::Function {
            return_type: Box::new(Type::Void),
            params: vec![],
        };
        table.declare_func("helper", sig.clone(), Span::dummy()).unwrap();
        table.define_func("helper", sig, Span::dummy()).unwrap();
        table.pop_scope(Span::dummy()).unwrap();
    }
}
