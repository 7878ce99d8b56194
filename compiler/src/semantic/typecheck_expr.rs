//! Expression type-checking.
//!
//! Every successful call to [`SemanticAnalyzer::check_expr`] annotates the
//! node with its resolved type via [`crate::ast::Expr::set_ty`] before
//! returning it, so a single pass leaves the tree ready for codegen.

use super::error::{SemanticError, SemanticErrorKind};
use super::symbol_table::Symbol;
use super::SemanticAnalyzer;
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp, Type};
use crate::token::Span;

fn type_error(message: impl Into<String>, span: Span) -> SemanticError {
    SemanticError::new(SemanticErrorKind::Type, message, span)
}

impl SemanticAnalyzer {
    pub(super) fn check_expr(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        let ty = self.check_expr_kind(expr)?;
        expr.set_ty(ty.clone());
        Ok(ty)
    }

    fn check_expr_kind(&mut self, expr: &Expr) -> Result<Type, SemanticError> {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Ok(Type::Int),
            ExprKind::CharLiteral(_) => Ok(Type::Char),
            ExprKind::BoolLiteral(_) => Ok(Type::Bool),
            ExprKind::NilLiteral => Ok(Type::Nil),
            ExprKind::StringLiteral(_) => Ok(Type::array_of(Type::Char)),
            ExprKind::Identifier(name) => {
                let symbol = self.symbols.lookup(name, expr.span)?;
                match symbol {
                    Symbol::Func { .. } => Err(type_error(
                        format!("'{}' names a function and cannot be used as a value", name),
                        expr.span,
                    )),
                    Symbol::Var { ty, .. } => Ok(ty),
                }
            }
            ExprKind::Paren(inner) => self.check_expr(inner),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr.span),
            ExprKind::Binary { op, left, right } => self.check_binary(*op, left, right, expr.span),
            ExprKind::New { elem_ty, size } => {
                let size_ty = self.check_expr(size)?;
                if size_ty != Type::Int {
                    return Err(type_error(
                        format!("array size must be 'int', found '{}'", size_ty),
                        size.span,
                    ));
                }
                Ok(Type::array_of(elem_ty.clone()))
            }
            ExprKind::Head(inner) => {
                if matches!(inner.kind, ExprKind::NilLiteral) {
                    return Err(type_error(
                        "cannot take 'head' of the bare literal 'nil': its element type is ambiguous",
                        expr.span,
                    ));
                }
                let list_ty = self.check_expr(inner)?;
                list_ty.element().cloned().ok_or_else(|| {
                    type_error(
                        format!("'head' requires a list, found '{}'", list_ty),
                        inner.span,
                    )
                })
            }
            ExprKind::Tail(inner) => {
                if matches!(inner.kind, ExprKind::NilLiteral) {
                    return Err(type_error(
                        "cannot take 'tail' of the bare literal 'nil': its element type is ambiguous",
                        expr.span,
                    ));
                }
                let list_ty = self.check_expr(inner)?;
                if !list_ty.is_list() {
                    return Err(type_error(
                        format!("'tail' requires a list, found '{}'", list_ty),
                        inner.span,
                    ));
                }
                Ok(list_ty)
            }
            ExprKind::IsNil(inner) => {
                let inner_ty = self.check_expr(inner)?;
                if !inner_ty.is_list() {
                    return Err(type_error(
                        format!("'nil?' requires a list, found '{}'", inner_ty),
                        inner.span,
                    ));
                }
                Ok(Type::Bool)
            }
            ExprKind::Index { array, index } => {
                let array_ty = self.check_expr(array)?;
                let index_ty = self.check_expr(index)?;
                if index_ty != Type::Int {
                    return Err(type_error(
                        format!("array index must be 'int', found '{}'", index_ty),
                        index.span,
                    ));
                }
                match array_ty {
                    Type::Array(elem) => Ok(*elem),
                    other => Err(type_error(
                        format!("indexing requires an array, found '{}'", other),
                        array.span,
                    )),
                }
            }
            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> Result<Type, SemanticError> {
        let operand_ty = self.check_expr(operand)?;
        match op {
            UnaryOp::Not => {
                if operand_ty != Type::Bool {
                    return Err(type_error(
                        format!("'not' requires 'bool', found '{}'", operand_ty),
                        span,
                    ));
                }
                Ok(Type::Bool)
            }
            UnaryOp::Plus | UnaryOp::Neg => {
                if operand_ty != Type::Int {
                    return Err(type_error(
                        format!("unary '+'/'-' requires 'int', found '{}'", operand_ty),
                        span,
                    ));
                }
                Ok(Type::Int)
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> Result<Type, SemanticError> {
        let left_ty = self.check_expr(left)?;
        let right_ty = self.check_expr(right)?;
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if left_ty != Type::Int || right_ty != Type::Int {
                    return Err(type_error(
                        format!(
                            "arithmetic operator requires 'int' operands, found '{}' and '{}'",
                            left_ty, right_ty
                        ),
                        span,
                    ));
                }
                Ok(Type::Int)
            }
            BinaryOp::And | BinaryOp::Or => {
                if left_ty != Type::Bool || right_ty != Type::Bool {
                    return Err(type_error(
                        format!(
                            "boolean operator requires 'bool' operands, found '{}' and '{}'",
                            left_ty, right_ty
                        ),
                        span,
                    ));
                }
                Ok(Type::Bool)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                if left_ty != right_ty {
                    return Err(type_error(
                        format!("cannot compare '{}' with '{}'", left_ty, right_ty),
                        span,
                    ));
                }
                Ok(Type::Bool)
            }
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => {
                if !matches!(left_ty, Type::Int | Type::Char) || left_ty != right_ty {
                    return Err(type_error(
                        format!(
                            "ordered comparison requires matching 'int' or 'char' operands, found '{}' and '{}'",
                            left_ty, right_ty
                        ),
                        span,
                    ));
                }
                Ok(Type::Bool)
            }
            BinaryOp::Cons => {
                if !matches!(right_ty, Type::List(_) | Type::Nil) {
                    return Err(type_error(
                        format!("'#' requires a list on the right, found '{}'", right_ty),
                        span,
                    ));
                }
                if right_ty != Type::Nil {
                    let elem = right_ty.element().expect("non-nil list has an element type");
                    if *elem != left_ty {
                        return Err(type_error(
                            format!(
                                "cannot cons a '{}' onto a list of '{}'",
                                left_ty, elem
                            ),
                            span,
                        ));
                    }
                }
                Ok(Type::list_of(left_ty))
            }
        }
    }

    fn check_call(&mut self, callee: &str, args: &[Expr], span: Span) -> Result<Type, SemanticError> {
        let symbol = self.symbols.lookup(callee, span)?;
        let Symbol::Func { ty } = symbol else {
            return Err(type_error(format!("'{}' is not callable", callee), span));
        };
        let Type::Function { return_type, params } = ty else {
            unreachable!("function symbols always carry a Function type")
        };

        if args.len() != params.len() {
            return Err(SemanticError::new(
                SemanticErrorKind::Arity,
                format!(
                    "'{}' expects {} argument{}, found {}",
                    callee,
                    params.len(),
                    if params.len() == 1 { "" } else { "s" },
                    args.len()
                ),
                span,
            ));
        }

        for (i, (arg, formal)) in args.iter().zip(params.iter()).enumerate() {
            if formal.by_ref && !arg.is_lvalue() {
                return Err(type_error(
                    format!(
                        "argument {} to '{}' is passed by reference and must be a variable or array element",
                        i + 1,
                        callee
                    ),
                    arg.span,
                ));
            }
            let arg_ty = self.check_expr(arg)?;
            if arg_ty != formal.ty {
                return Err(type_error(
                    format!(
                        "argument {} to '{}' expects '{}', found '{}'",
                        i + 1,
                        callee,
                        formal.ty,
                        arg_ty
                    ),
                    arg.span,
                ));
            }
        }

        Ok(*return_type)
    }
}
