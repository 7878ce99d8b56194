//! Statement code generation.

use super::{Codegen, CodegenError};
use crate::ast::{SimpleStmt, Stmt, StmtKind};

impl<'ctx> Codegen<'ctx> {
    pub(super) fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match &stmt.kind {
            StmtKind::Skip => Ok(()),
            StmtKind::Assign { target, value } => {
                let rvalue = self.compile_expr(value)?;
                let ptr = self.compile_lvalue_ptr(target)?;
                self.builder
                    .build_store(ptr, rvalue)
                    .map_err(|e| CodegenError::new(e.to_string(), stmt.span))?;
                Ok(())
            }
            StmtKind::Call(call) => {
                self.compile_expr(call)?;
                Ok(())
            }
            StmtKind::If { arms, else_body } => self.compile_if(arms, else_body.as_deref(), stmt.span),
            StmtKind::For {
                init,
                condition,
                step,
                body,
            } => self.compile_for(init, condition, step, body, stmt.span),
            StmtKind::Return(value) => {
                match value {
                    Some(expr) => {
                        let v = self.compile_expr(expr)?;
                        self.builder
                            .build_return(Some(&v))
                            .map_err(|e| CodegenError::new(e.to_string(), stmt.span))?;
                    }
                    None => {
                        self.builder
                            .build_return(None)
                            .map_err(|e| CodegenError::new(e.to_string(), stmt.span))?;
                    }
                }
                Ok(())
            }
            StmtKind::Exit => {
                self.builder
                    .build_return(None)
                    .map_err(|e| CodegenError::new(e.to_string(), stmt.span))?;
                Ok(())
            }
        }
    }

    fn compile_simple(&mut self, simple: &SimpleStmt, span: crate::token::Span) -> Result<(), CodegenError> {
        match simple {
            SimpleStmt::Skip => Ok(()),
            SimpleStmt::Assign { target, value } => {
                let rvalue = self.compile_expr(value)?;
                let ptr = self.compile_lvalue_ptr(target)?;
                self.builder
                    .build_store(ptr, rvalue)
                    .map_err(|e| CodegenError::new(e.to_string(), span))?;
                Ok(())
            }
            SimpleStmt::Call(call) => {
                self.compile_expr(call)?;
                Ok(())
            }
        }
    }

    /// Chains each arm's condition/body through its own pair of blocks,
    /// falling through to the next arm's test on a false condition, and
    /// joins every taken branch (that doesn't already end in a terminator,
    /// e.g. a `return`) at a shared merge block.
    fn compile_if(
        &mut self,
        arms: &[crate::ast::IfArm],
        else_body: Option<&[Stmt]>,
        span: crate::token::Span,
    ) -> Result<(), CodegenError> {
        let function = self
            .current_function
            .expect("statements are only compiled inside a function body");
        let merge_block = self.context.append_basic_block(function, "if.end");

        for (i, arm) in arms.iter().enumerate() {
            let cond = self.compile_expr(&arm.condition)?.into_int_value();
            let then_block = self.context.append_basic_block(function, &format!("if.then{i}"));
            let next_block = self.context.append_basic_block(function, &format!("if.next{i}"));
            self.builder
                .build_conditional_branch(cond, then_block, next_block)
                .map_err(|e| CodegenError::new(e.to_string(), span))?;

            self.builder.position_at_end(then_block);
            for s in &arm.body {
                self.compile_stmt(s)?;
            }
            self.branch_to_merge_if_open(merge_block, span)?;

            self.builder.position_at_end(next_block);
        }

        if let Some(body) = else_body {
            for s in body {
                self.compile_stmt(s)?;
            }
        }
        self.branch_to_merge_if_open(merge_block, span)?;

        self.builder.position_at_end(merge_block);
        Ok(())
    }

    /// Branches the current block to `target` unless it already ends in a
    /// terminator (e.g. the block's last statement was a `return` or an
    /// `exit`) — LLVM rejects a second terminator in the same block.
    fn branch_to_merge_if_open(
        &mut self,
        target: inkwell::basic_block::BasicBlock<'ctx>,
        span: crate::token::Span,
    ) -> Result<(), CodegenError> {
        let current = self
            .builder
            .get_insert_block()
            .expect("builder always has an open block while compiling statements");
        if current.get_terminator().is_none() {
            self.builder
                .build_unconditional_branch(target)
                .map_err(|e| CodegenError::new(e.to_string(), span))?;
        }
        Ok(())
    }

    fn compile_for(
        &mut self,
        init: &[SimpleStmt],
        condition: &crate::ast::Expr,
        step: &[SimpleStmt],
        body: &[Stmt],
        span: crate::token::Span,
    ) -> Result<(), CodegenError> {
        let function = self
            .current_function
            .expect("statements are only compiled inside a function body");

        for s in init {
            self.compile_simple(s, span)?;
        }

        let cond_block = self.context.append_basic_block(function, "for.cond");
        let body_block = self.context.append_basic_block(function, "for.body");
        let end_block = self.context.append_basic_block(function, "for.end");

        self.builder
            .build_unconditional_branch(cond_block)
            .map_err(|e| CodegenError::new(e.to_string(), span))?;

        self.builder.position_at_end(cond_block);
        let cond = self.compile_expr(condition)?.into_int_value();
        self.builder
            .build_conditional_branch(cond, body_block, end_block)
            .map_err(|e| CodegenError::new(e.to_string(), span))?;

        self.builder.position_at_end(body_block);
        for s in body {
            self.compile_stmt(s)?;
        }
        for s in step {
            self.compile_simple(s, span)?;
        }
        self.branch_to_merge_if_open(cond_block, span)?;

        self.builder.position_at_end(end_block);
        Ok(())
    }
}
