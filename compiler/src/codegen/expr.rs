//! Expression code generation.

use inkwell::AddressSpace;
use inkwell::IntPredicate;
use inkwell::values::{BasicValue, BasicValueEnum, PointerValue};

use super::{CodegenError, Codegen};
use crate::ast::{BinaryOp, Expr, ExprKind, Type, UnaryOp};

impl<'ctx> Codegen<'ctx> {
    pub(super) fn compile_expr(&mut self, expr: &Expr) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        match &expr.kind {
            ExprKind::IntLiteral(n) => Ok(self
                .context
                .i32_type()
                .const_int(*n as u64, true)
                .as_basic_value_enum()),
            ExprKind::CharLiteral(c) => Ok(self
                .context
                .i8_type()
                .const_int(*c as u64, false)
                .as_basic_value_enum()),
            ExprKind::BoolLiteral(b) => Ok(self
                .context
                .bool_type()
                .const_int(*b as u64, false)
                .as_basic_value_enum()),
            ExprKind::NilLiteral => Ok(self
                .context
                .ptr_type(AddressSpace::default())
                .const_null()
                .as_basic_value_enum()),
            ExprKind::StringLiteral(bytes) => Ok(self.compile_string_literal(bytes).as_basic_value_enum()),
            ExprKind::Identifier(name) => {
                let binding = self.lookup_var(name).clone();
                self.builder
                    .build_load(self.basic_type(binding.ty()), binding.ptr(), name)
                    .map_err(|e| CodegenError::new(e.to_string(), expr.span))
            }
            ExprKind::Paren(inner) => self.compile_expr(inner),
            ExprKind::Unary { op, operand } => self.compile_unary(*op, operand, expr.span),
            ExprKind::Binary { op, left, right } => self.compile_binary(*op, left, right, expr.span),
            ExprKind::New { elem_ty, size } => self.compile_new(elem_ty, size, expr.span),
            ExprKind::Head(inner) => self.compile_head(inner, expr.span),
            ExprKind::Tail(inner) => self.compile_tail(inner, expr.span),
            ExprKind::IsNil(inner) => {
                let value = self.compile_expr(inner)?.into_pointer_value();
                self.builder
                    .build_is_null(value, "nil_check")
                    .map(|v| v.as_basic_value_enum())
                    .map_err(|e| CodegenError::new(e.to_string(), expr.span))
            }
            ExprKind::Index { array, index } => {
                let ptr = self.compile_index_ptr(array, index, expr.span)?;
                let elem_ty = self.basic_type(&expr.ty());
                self.builder
                    .build_load(elem_ty, ptr, "elem")
                    .map_err(|e| CodegenError::new(e.to_string(), expr.span))
            }
            ExprKind::Call { callee, args } => self.compile_call(callee, args, expr.span),
        }
    }

    /// Returns the address of an lvalue expression — an identifier's
    /// storage, or an indexed array element.
    pub(super) fn compile_lvalue_ptr(&mut self, expr: &Expr) -> Result<PointerValue<'ctx>, CodegenError> {
        match &expr.kind {
            ExprKind::Identifier(name) => Ok(self.lookup_var(name).ptr()),
            ExprKind::Index { array, index } => self.compile_index_ptr(array, index, expr.span),
            _ => unreachable!("semantic analysis only allows identifiers/indices as lvalues"),
        }
    }

    fn compile_index_ptr(
        &mut self,
        array: &Expr,
        index: &Expr,
        span: crate::token::Span,
    ) -> Result<PointerValue<'ctx>, CodegenError> {
        let base = self.compile_expr(array)?.into_pointer_value();
        let index_value = self.compile_expr(index)?.into_int_value();
        let elem_ty = match array.ty() {
            Type::Array(elem) => self.basic_type(&elem),
            _ => unreachable!("semantic analysis guarantees indexing is over an array"),
        };
        unsafe {
            self.builder
                .build_gep(elem_ty, base, &[index_value], "elem_ptr")
                .map_err(|e| CodegenError::new(e.to_string(), span))
        }
    }

    fn compile_string_literal(&mut self, bytes: &[u8]) -> PointerValue<'ctx> {
        let name = format!("str.{}", self.string_literal_count);
        self.string_literal_count += 1;
        let mut terminated = bytes.to_vec();
        terminated.push(0);
        let constant = self.context.const_string(&terminated, false);
        let global = self.module.add_global(constant.get_type(), None, &name);
        global.set_initializer(&constant);
        global.set_constant(true);
        global.as_pointer_value()
    }

    fn compile_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        span: crate::token::Span,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let value = self.compile_expr(operand)?;
        match op {
            UnaryOp::Plus => Ok(value),
            UnaryOp::Neg => self
                .builder
                .build_int_neg(value.into_int_value(), "neg")
                .map(|v| v.as_basic_value_enum())
                .map_err(|e| CodegenError::new(e.to_string(), span)),
            UnaryOp::Not => {
                let one = self.context.bool_type().const_int(1, false);
                self.builder
                    .build_xor(value.into_int_value(), one, "not")
                    .map(|v| v.as_basic_value_enum())
                    .map_err(|e| CodegenError::new(e.to_string(), span))
            }
        }
    }

    fn compile_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: crate::token::Span,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        if op == BinaryOp::Cons {
            return self.compile_cons(left, right, span);
        }

        let lhs = self.compile_expr(left)?;
        let rhs = self.compile_expr(right)?;
        let to_err = |e: inkwell::builder::BuilderError| CodegenError::new(e.to_string(), span);

        match op {
            BinaryOp::Add => self
                .builder
                .build_int_add(lhs.into_int_value(), rhs.into_int_value(), "add")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Sub => self
                .builder
                .build_int_sub(lhs.into_int_value(), rhs.into_int_value(), "sub")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Mul => self
                .builder
                .build_int_mul(lhs.into_int_value(), rhs.into_int_value(), "mul")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Div => self
                .builder
                .build_int_signed_div(lhs.into_int_value(), rhs.into_int_value(), "div")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Mod => self
                .builder
                .build_int_signed_rem(lhs.into_int_value(), rhs.into_int_value(), "mod")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::And => self
                .builder
                .build_and(lhs.into_int_value(), rhs.into_int_value(), "and")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Or => self
                .builder
                .build_or(lhs.into_int_value(), rhs.into_int_value(), "or")
                .map(Into::into)
                .map_err(to_err),
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => {
                let signed = left.ty() == Type::Int;
                let predicate = match (op, signed) {
                    (BinaryOp::Eq, _) => IntPredicate::EQ,
                    (BinaryOp::NotEq, _) => IntPredicate::NE,
                    (BinaryOp::Less, true) => IntPredicate::SLT,
                    (BinaryOp::Less, false) => IntPredicate::ULT,
                    (BinaryOp::Greater, true) => IntPredicate::SGT,
                    (BinaryOp::Greater, false) => IntPredicate::UGT,
                    (BinaryOp::LessEq, true) => IntPredicate::SLE,
                    (BinaryOp::LessEq, false) => IntPredicate::ULE,
                    (BinaryOp::GreaterEq, true) => IntPredicate::SGE,
                    (BinaryOp::GreaterEq, false) => IntPredicate::UGE,
                    _ => unreachable!(),
                };
                self.builder
                    .build_int_compare(predicate, lhs.into_int_value(), rhs.into_int_value(), "cmp")
                    .map(Into::into)
                    .map_err(to_err)
            }
            BinaryOp::Cons => unreachable!("handled above"),
        }
    }

    /// Builds a cons cell `{ head: T, tail: ptr }`, stores `left` and
    /// `right` into it, and returns the cell's address as the new list
    /// head.
    fn compile_cons(
        &mut self,
        left: &Expr,
        right: &Expr,
        span: crate::token::Span,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let head_value = self.compile_expr(left)?;
        let tail_value = self.compile_expr(right)?;
        let cell_ty = self.list_cell_type(&left.ty());
        let cell = self
            .builder
            .build_malloc(cell_ty, "cons")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        let head_field = self
            .builder
            .build_struct_gep(cell_ty, cell, 0, "cons.head")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        self.builder
            .build_store(head_field, head_value)
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        let tail_field = self
            .builder
            .build_struct_gep(cell_ty, cell, 1, "cons.tail")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        self.builder
            .build_store(tail_field, tail_value)
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        Ok(cell.as_basic_value_enum())
    }

    fn compile_head(&mut self, list: &Expr, span: crate::token::Span) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let elem_ty = list.ty().element().expect("head operand is a list type").clone();
        let (cell, cell_ty) = self.compile_cons_cell(list, &elem_ty)?;
        let head_field = self
            .builder
            .build_struct_gep(cell_ty, cell, 0, "head_field")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        self.builder
            .build_load(self.basic_type(&elem_ty), head_field, "head")
            .map_err(|e| CodegenError::new(e.to_string(), span))
    }

    fn compile_tail(&mut self, list: &Expr, span: crate::token::Span) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let elem_ty = list.ty().element().expect("tail operand is a list type").clone();
        let (cell, cell_ty) = self.compile_cons_cell(list, &elem_ty)?;
        let tail_field = self
            .builder
            .build_struct_gep(cell_ty, cell, 1, "tail_field")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        self.builder
            .build_load(self.context.ptr_type(AddressSpace::default()), tail_field, "tail")
            .map_err(|e| CodegenError::new(e.to_string(), span))
    }

    fn compile_cons_cell(
        &mut self,
        list: &Expr,
        elem_ty: &Type,
    ) -> Result<(PointerValue<'ctx>, inkwell::types::StructType<'ctx>), CodegenError> {
        let cell = self.compile_expr(list)?.into_pointer_value();
        let cell_ty = self.list_cell_type(elem_ty);
        Ok((cell, cell_ty))
    }

    /// `new T[e]` allocates on the stack: arrays are scoped to their
    /// defining function and do not escape it unless passed by reference.
    fn compile_new(
        &mut self,
        elem_ty: &Type,
        size: &Expr,
        span: crate::token::Span,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let size_value = self.compile_expr(size)?.into_int_value();
        self.builder
            .build_array_alloca(self.basic_type(elem_ty), size_value, "new_array")
            .map(|v| v.as_basic_value_enum())
            .map_err(|e| CodegenError::new(e.to_string(), span))
    }

    fn compile_call(
        &mut self,
        callee: &str,
        args: &[Expr],
        span: crate::token::Span,
    ) -> Result<BasicValueEnum<'ctx>, CodegenError> {
        let func = self.lookup_func(callee);
        let by_refs = self.param_by_refs_of(callee);
        let mut arg_values = Vec::with_capacity(args.len());
        for (arg, by_ref) in args.iter().zip(by_refs) {
            if by_ref {
                arg_values.push(self.compile_lvalue_ptr(arg)?.into());
            } else {
                arg_values.push(self.compile_expr(arg)?.into());
            }
        }
        for name in self.captures_of(callee) {
            arg_values.push(self.lookup_var(&name).ptr().into());
        }

        let call = self
            .builder
            .build_call(func, &arg_values, "call")
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        match call.try_as_basic_value().left() {
            Some(v) => Ok(v),
            None => Ok(self.context.bool_type().const_zero().as_basic_value_enum()),
        }
    }
}
