//! Variable binding management for code generation.
//!
//! A [`VarBinding`] records the address a variable lives at and its Tony
//! type. The address is an LLVM `alloca` for locals and by-value
//! parameters, or the incoming pointer itself for by-reference parameters
//! and captures — either way, reads and writes to the variable go through
//! the same `load`/`store` on this one pointer.

use crate::ast::Type;
use inkwell::values::PointerValue;

#[derive(Clone, Debug)]
pub(super) struct VarBinding<'ctx> {
    ptr: PointerValue<'ctx>,
    ty: Type,
}

impl<'ctx> VarBinding<'ctx> {
    pub(super) fn new(ptr: PointerValue<'ctx>, ty: Type) -> Self {
        VarBinding { ptr, ty }
    }

    pub(super) fn ptr(&self) -> PointerValue<'ctx> {
        self.ptr
    }

    pub(super) fn ty(&self) -> &Type {
        &self.ty
    }
}
