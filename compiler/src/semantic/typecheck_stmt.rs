//! Statement type-checking.

use super::error::{SemanticError, SemanticErrorKind};
use super::SemanticAnalyzer;
use crate::ast::{Expr, Header, SimpleStmt, Stmt, StmtKind, Type};
use crate::token::Span;

fn type_error(message: impl Into<String>, span: Span) -> SemanticError {
    SemanticError::new(SemanticErrorKind::Type, message, span)
}

impl SemanticAnalyzer {
    pub(super) fn analyze_stmt(&mut self, stmt: &Stmt, header: &Header) -> Result<(), SemanticError> {
        match &stmt.kind {
            StmtKind::Skip => Ok(()),
            StmtKind::Assign { target, value } => self.check_assign(target, value, stmt.span),
            StmtKind::Call(call) => {
                self.check_expr(call)?;
                Ok(())
            }
            StmtKind::If { arms, else_body } => {
                for arm in arms {
                    let cond_ty = self.check_expr(&arm.condition)?;
                    if cond_ty != Type::Bool {
                        return Err(type_error(
                            format!("'if' condition must be 'bool', found '{}'", cond_ty),
                            arm.condition.span,
                        ));
                    }
                    for s in &arm.body {
                        self.analyze_stmt(s, header)?;
                    }
                }
                if let Some(body) = else_body {
                    for s in body {
                        self.analyze_stmt(s, header)?;
                    }
                }
                Ok(())
            }
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => {
                for simple in init {
                    self.check_simple(simple, stmt.span)?;
                }
                let cond_ty = self.check_expr(condition)?;
                if cond_ty != Type::Bool {
                    return Err(type_error(
                        format!("'for' condition must be 'bool', found '{}'", cond_ty),
                        condition.span,
                    ));
                }
                for simple in step {
                    self.check_simple(simple, stmt.span)?;
                }
                for s in body {
                    self.analyze_stmt(s, header)?;
                }
                Ok(())
            }
            StmtKind::Return(value) => self.check_return(value.as_ref(), header, stmt.span),
            StmtKind::Exit => {
                if header.return_type != Type::Void {
                    return Err(SemanticError::new(
                        SemanticErrorKind::ControlFlow,
                        "'exit' can only appear inside a 'void' function",
                        stmt.span,
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_simple(&mut self, simple: &SimpleStmt, span: Span) -> Result<(), SemanticError> {
        match simple {
            SimpleStmt::Skip => Ok(()),
            SimpleStmt::Assign { target, value } => self.check_assign(target, value, span),
            SimpleStmt::Call(call) => {
                self.check_expr(call)?;
                Ok(())
            }
        }
    }

    fn check_assign(&mut self, target: &Expr, value: &Expr, span: Span) -> Result<(), SemanticError> {
        if !target.is_lvalue() {
            return Err(type_error("the left side of ':=' must be a variable or array element", span));
        }
        let target_ty = self.check_expr(target)?;
        let value_ty = self.check_expr(value)?;
        if target_ty != value_ty {
            return Err(type_error(
                format!(
                    "cannot assign '{}' to a variable of type '{}'",
                    value_ty, target_ty
                ),
                value.span,
            ));
        }
        Ok(())
    }

    fn check_return(
        &mut self,
        value: Option<&Expr>,
        header: &Header,
        span: Span,
    ) -> Result<(), SemanticError> {
        match value {
            Some(expr) => {
                let value_ty = self.check_expr(expr)?;
                if header.return_type == Type::Void {
                    return Err(type_error(
                        format!("function '{}' is 'void' and cannot return a value", header.name),
                        expr.span,
                    ));
                }
                if value_ty != header.return_type {
                    return Err(type_error(
                        format!(
                            "function '{}' returns '{}', found '{}'",
                            header.name, header.return_type, value_ty
                        ),
                        expr.span,
                    ));
                }
                Ok(())
            }
            None => {
                if header.return_type != Type::Void {
                    return Err(type_error(
                        format!(
                            "function '{}' returns '{}' and requires a value after 'return'",
                            header.name, header.return_type
                        ),
                        span,
                    ));
                }
                Ok(())
            }
        }
    }
}
