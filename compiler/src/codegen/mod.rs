//! LLVM code generation for the Tony programming language.
//!
//! [`Codegen`] lowers a semantically-analyzed [`Program`] to an LLVM
//! [`inkwell::module::Module`] and writes it out as textual IR. Unlike a
//! compiler that hands LLVM a finished object file directly, this one stops
//! at IR: the driver shells out to `llc` and then the system linker, which
//! is the same two-step pipeline the reference `tonyc` front end uses.
//!
//! # Representation
//!
//! - `int` → `i32`, `char` → `i8`, `bool` → `i1`.
//! - `array of T` and `list [T]` are both a single opaque `ptr`. Arrays
//!   (`new T[e]`) are stack-allocated in their defining function's frame and
//!   never escape it except by reference. Lists are a chain of
//!   heap-`malloc`'d, two-field cons cells — one named struct type per
//!   distinct element type, built lazily and reused ([`Codegen::list_cell_type`]).
//!   `nil` is the null pointer, which doubles as the empty list and (since
//!   arrays are never compared to nil) is only ever produced by list
//!   expressions.
//! - A captured variable is always passed to the capturing function as an
//!   extra by-reference parameter — a pointer to the outer variable's
//!   storage — appended after its declared formals, in the order recorded
//!   by semantic analysis (`Header::extra_params`).
//!
//! # Module Structure
//!
//! - [`error`] — [`CodegenError`]
//! - [`binding`] — [`binding::VarBinding`], a variable's address and type
//! - [`expr`] — expression lowering
//! - [`stmt`] — statement and function-body lowering

mod binding;
mod error;
mod expr;
mod stmt;

#[cfg(test)]
mod tests;

pub use error::CodegenError;

use std::collections::HashMap;
use std::path::Path;

use inkwell::AddressSpace;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum};
use inkwell::values::{BasicValueEnum, FunctionValue};

use crate::ast::{Def, FuncDef, Header, Program, Type};
use binding::VarBinding;

/// One lexical scope's worth of codegen-time bindings: the variables
/// defined directly in it, and the functions declared or defined in it
/// (keyed by their *unqualified* Tony name, the only name a call site can
/// use — `LoopControl` and qualified LLVM names never leak into a lookup).
struct Scope<'ctx> {
    vars: HashMap<String, VarBinding<'ctx>>,
    funcs: HashMap<String, FunctionValue<'ctx>>,
    /// Each function's capture names, in the order they were appended as
    /// extra parameters — looked up again at call sites to pass the right
    /// addresses through.
    captures: HashMap<String, Vec<String>>,
    /// Each function's declared (non-capture) formals' by-reference flags,
    /// in order. An LLVM `ptr` parameter is ambiguous on its own — both a
    /// by-reference scalar and a by-value array/list lower to `ptr` — so
    /// call sites consult this instead of the parameter's LLVM type.
    param_by_refs: HashMap<String, Vec<bool>>,
}

impl<'ctx> Scope<'ctx> {
    fn new() -> Self {
        Scope {
            vars: HashMap::new(),
            funcs: HashMap::new(),
            captures: HashMap::new(),
            param_by_refs: HashMap::new(),
        }
    }
}

/// LLVM code generator for Tony programs.
pub struct Codegen<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    scopes: Vec<Scope<'ctx>>,
    current_function: Option<FunctionValue<'ctx>>,
    string_literal_count: usize,
    /// One named `{ head, tail: ptr }` struct per distinct list element
    /// type, keyed by the element type's rendered name — created on first
    /// use and reused by every `#`/`head`/`tail` over that element type.
    list_cell_types: HashMap<String, inkwell::types::StructType<'ctx>>,
}

impl<'ctx> Codegen<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str) -> Self {
        Codegen {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            scopes: Vec::new(),
            current_function: None,
            string_literal_count: 0,
            list_cell_types: HashMap::new(),
        }
    }

    /// Returns the named cons-cell struct type for `elem_ty`, creating it
    /// the first time this element type is seen.
    fn list_cell_type(&mut self, elem_ty: &Type) -> inkwell::types::StructType<'ctx> {
        let key = elem_ty.to_string();
        if let Some(ty) = self.list_cell_types.get(&key) {
            return *ty;
        }
        let name = format!("list.{}", key.replace([' ', '[', ']'], "_"));
        let cell_ty = self.context.opaque_struct_type(&name);
        let ptr_type = self.context.ptr_type(AddressSpace::default());
        cell_ty.set_body(&[self.basic_type(elem_ty), ptr_type.into()], false);
        self.list_cell_types.insert(key, cell_ty);
        cell_ty
    }

    /// Compiles a whole program: the Tony `main` function (emitted under
    /// the internal name `tony_main`) plus a thin C `main` that calls it,
    /// since Tony's `main` is `void` and a process entry point must return
    /// `int`.
    pub fn compile(&mut self, program: &Program) -> Result<(), CodegenError> {
        self.scopes.push(Scope::new());
        self.declare_runtime_functions();
        let tony_main = self.declare_function(&program.main.header, "tony_main", &[])?;
        self.define_param_by_refs(
            "tony_main",
            program.main.header.params.iter().map(|p| p.by_ref).collect(),
        );
        self.build_function_body(&program.main, tony_main, "tony_main", &[])?;
        self.scopes.pop();

        self.build_c_main(tony_main)?;
        Ok(())
    }

    /// Declares the runtime library's external functions — `tony-runtime`
    /// defines their bodies, resolved by the linker — so calls to them
    /// resolve like any other function without a Tony header ever having
    /// been parsed for them.
    fn declare_runtime_functions(&mut self) {
        let void = self.context.void_type();
        let i32_t = self.context.i32_type();
        let i8_t = self.context.i8_type();
        let bool_t = self.context.bool_type();
        let ptr_t = self.context.ptr_type(AddressSpace::default());

        let sigs: [(&str, inkwell::types::FunctionType<'ctx>); 15] = [
            ("puti", void.fn_type(&[i32_t.into()], false)),
            ("putb", void.fn_type(&[bool_t.into()], false)),
            ("putc", void.fn_type(&[i8_t.into()], false)),
            ("puts", void.fn_type(&[ptr_t.into()], false)),
            ("geti", i32_t.fn_type(&[], false)),
            ("getb", bool_t.fn_type(&[], false)),
            ("getc", i8_t.fn_type(&[], false)),
            ("gets", void.fn_type(&[i32_t.into(), ptr_t.into()], false)),
            ("abs", i32_t.fn_type(&[i32_t.into()], false)),
            ("ord", i32_t.fn_type(&[i8_t.into()], false)),
            ("chr", i8_t.fn_type(&[i32_t.into()], false)),
            ("strlen", i32_t.fn_type(&[ptr_t.into()], false)),
            ("strcmp", i32_t.fn_type(&[ptr_t.into(), ptr_t.into()], false)),
            ("strcpy", void.fn_type(&[ptr_t.into(), ptr_t.into()], false)),
            ("strcat", void.fn_type(&[ptr_t.into(), ptr_t.into()], false)),
        ];

        for (name, fn_type) in sigs {
            let func = self.module.add_function(name, fn_type, None);
            let param_count = func.count_params() as usize;
            self.define_func(name, func);
            self.define_param_by_refs(name, vec![false; param_count]);
        }
    }

    /// Writes the module's textual LLVM IR to `path`, ready for `llc`.
    pub fn write_ir_to_file(&self, path: &Path) -> Result<(), CodegenError> {
        self.module
            .print_to_file(path)
            .map_err(|e| CodegenError::without_span(format!("failed to write IR: {}", e)))
    }

    /// Renders the module's textual LLVM IR, for `-i` mode.
    pub fn ir_to_string(&self) -> String {
        self.module.print_to_string().to_string()
    }

    fn build_c_main(&mut self, tony_main: FunctionValue<'ctx>) -> Result<(), CodegenError> {
        let i32_type = self.context.i32_type();
        let fn_type = i32_type.fn_type(&[], false);
        let main_fn = self.module.add_function("main", fn_type, None);
        let entry = self.context.append_basic_block(main_fn, "entry");
        self.builder.position_at_end(entry);
        self.builder
            .build_call(tony_main, &[], "")
            .map_err(|e| CodegenError::without_span(e.to_string()))?;
        self.builder
            .build_return(Some(&i32_type.const_int(0, false)))
            .map_err(|e| CodegenError::without_span(e.to_string()))?;
        Ok(())
    }

    // ---- type lowering -------------------------------------------------

    /// Lowers a scalar Tony type to its LLVM representation. Arrays and
    /// lists are both opaque pointers (see module docs) and are lowered by
    /// [`Self::basic_type`] instead, since they need no further case split.
    fn basic_type(&self, ty: &Type) -> BasicTypeEnum<'ctx> {
        match ty {
            Type::Int => self.context.i32_type().into(),
            Type::Char => self.context.i8_type().into(),
            Type::Bool => self.context.bool_type().into(),
            Type::Array(_) | Type::List(_) | Type::Nil => {
                self.context.ptr_type(AddressSpace::default()).into()
            }
            Type::Void | Type::Function { .. } => {
                unreachable!("void/function types are never carried by a value")
            }
        }
    }

    /// The LLVM parameter type for a formal: a pointer when it is passed
    /// by reference (or is a synthesized capture, which is always by
    /// reference), its plain basic type otherwise.
    fn param_type(&self, ty: &Type, by_ref: bool) -> BasicMetadataTypeEnum<'ctx> {
        if by_ref {
            self.context.ptr_type(AddressSpace::default()).into()
        } else {
            self.basic_type(ty).into()
        }
    }

    // ---- scope plumbing -------------------------------------------------

    fn define_var(&mut self, name: &str, binding: VarBinding<'ctx>) {
        self.scopes
            .last_mut()
            .expect("no open codegen scope")
            .vars
            .insert(name.to_string(), binding);
    }

    fn lookup_var(&self, name: &str) -> &VarBinding<'ctx> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(name))
            .expect("semantic analysis guarantees every name resolves")
    }

    fn define_func(&mut self, name: &str, func: FunctionValue<'ctx>) {
        self.scopes
            .last_mut()
            .expect("no open codegen scope")
            .funcs
            .insert(name.to_string(), func);
    }

    fn lookup_func(&self, name: &str) -> FunctionValue<'ctx> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.funcs.get(name).copied())
            .expect("semantic analysis guarantees every callee resolves")
    }

    fn define_captures(&mut self, name: &str, captures: Vec<String>) {
        self.scopes
            .last_mut()
            .expect("no open codegen scope")
            .captures
            .insert(name.to_string(), captures);
    }

    /// The capture names recorded for a callee, in call-argument order.
    pub(super) fn captures_of(&self, name: &str) -> Vec<String> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.captures.get(name).cloned())
            .unwrap_or_default()
    }

    fn define_param_by_refs(&mut self, name: &str, by_refs: Vec<bool>) {
        self.scopes
            .last_mut()
            .expect("no open codegen scope")
            .param_by_refs
            .insert(name.to_string(), by_refs);
    }

    /// The by-reference flag of each of a callee's declared (non-capture)
    /// formals, in order.
    pub(super) fn param_by_refs_of(&self, name: &str) -> Vec<bool> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.param_by_refs.get(name).cloned())
            .expect("semantic analysis guarantees every callee resolves")
    }

    // ---- function declaration and body -------------------------------

    /// Declares (but does not define) a function's LLVM signature, under
    /// `llvm_name`. `extra_param_types` supplies the Tony type of each
    /// capture, in the order `header.extra_params()` lists their names —
    /// the caller looks these up from its own scope before this is called.
    fn declare_function(
        &mut self,
        header: &Header,
        llvm_name: &str,
        extra_param_types: &[Type],
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        let mut param_types: Vec<BasicMetadataTypeEnum> = header
            .params
            .iter()
            .map(|p| self.param_type(&p.ty, p.by_ref))
            .collect();
        for ty in extra_param_types {
            param_types.push(self.param_type(ty, true));
        }

        let fn_type = match &header.return_type {
            Type::Void => self.context.void_type().fn_type(&param_types, false),
            other => self.basic_type(other).fn_type(&param_types, false),
        };

        Ok(self.module.add_function(llvm_name, fn_type, None))
    }

    /// Generates a function's body into an already-declared `FunctionValue`.
    /// `capture_names` is `header.extra_params()`, passed in by the caller
    /// since it also had to resolve `extra_param_types` for
    /// [`Self::declare_function`].
    fn build_function_body(
        &mut self,
        func: &FuncDef,
        llvm_fn: FunctionValue<'ctx>,
        qualified_name: &str,
        capture_names: &[String],
    ) -> Result<(), CodegenError> {
        let previous_function = self.current_function.replace(llvm_fn);
        let previous_block = self.builder.get_insert_block();

        let entry = self.context.append_basic_block(llvm_fn, "entry");
        self.builder.position_at_end(entry);
        self.scopes.push(Scope::new());

        let mut param_idx = 0u32;
        for param in &func.header.params {
            let value = llvm_fn
                .get_nth_param(param_idx)
                .expect("declared parameter count matches header.params");
            param_idx += 1;
            let binding = if param.by_ref {
                VarBinding::new(value.into_pointer_value(), param.ty.clone())
            } else {
                let alloca = self
                    .builder
                    .build_alloca(self.basic_type(&param.ty), &param.name)
                    .map_err(|e| CodegenError::new(e.to_string(), param.span))?;
                self.builder
                    .build_store(alloca, value)
                    .map_err(|e| CodegenError::new(e.to_string(), param.span))?;
                VarBinding::new(alloca, param.ty.clone())
            };
            self.define_var(&param.name, binding);
        }
        for name in capture_names {
            let value = llvm_fn
                .get_nth_param(param_idx)
                .expect("declared capture count matches capture_names");
            param_idx += 1;
            let ty = self.lookup_var(name).ty().clone();
            self.define_var(name, VarBinding::new(value.into_pointer_value(), ty));
        }

        self.build_locals_and_body(func, qualified_name)?;

        if func.header.return_type == Type::Void {
            self.builder
                .build_return(None)
                .map_err(|e| CodegenError::new(e.to_string(), func.span))?;
        }
        // A non-`void` function's every path already ends in an explicit
        // `return` (semantic analysis rejected it otherwise), so no
        // implicit terminator is needed there.

        self.scopes.pop();
        self.current_function = previous_function;
        if let Some(block) = previous_block {
            self.builder.position_at_end(block);
        }
        Ok(())
    }

    /// Declares every nested function/forward-declaration in `func.locals`
    /// up front (so mutual recursion resolves), allocates storage for
    /// every local variable, then generates each nested function's body.
    fn build_locals_and_body(
        &mut self,
        func: &FuncDef,
        qualified_name: &str,
    ) -> Result<(), CodegenError> {
        for local in &func.locals {
            let header = match local {
                Def::Decl(d) => &d.header,
                Def::Func(f) => &f.header,
                Def::Var(_) => continue,
            };
            if self.scopes.last().unwrap().funcs.contains_key(&header.name) {
                continue;
            }
            let extra_types: Vec<Type> = header
                .extra_params()
                .iter()
                .map(|name| self.lookup_var(name).ty().clone())
                .collect();
            let llvm_name = format!("{}.{}", qualified_name, header.name);
            let llvm_fn = self.declare_function(header, &llvm_name, &extra_types)?;
            self.define_func(&header.name, llvm_fn);
            self.define_captures(&header.name, header.extra_params());
            self.define_param_by_refs(&header.name, header.params.iter().map(|p| p.by_ref).collect());
        }

        for local in &func.locals {
            match local {
                Def::Var(var_def) => {
                    for name in &var_def.names {
                        let alloca = self
                            .builder
                            .build_alloca(self.basic_type(&var_def.ty), name)
                            .map_err(|e| CodegenError::new(e.to_string(), var_def.span))?;
                        self.zero_initialize(alloca, &var_def.ty, var_def.span)?;
                        self.define_var(name, VarBinding::new(alloca, var_def.ty.clone()));
                    }
                }
                Def::Decl(_) => {}
                Def::Func(nested) => {
                    let llvm_fn = self.lookup_func(&nested.header.name);
                    let capture_names = nested.header.extra_params();
                    let qualified = format!("{}.{}", qualified_name, nested.header.name);
                    self.build_function_body(nested, llvm_fn, &qualified, &capture_names)?;
                    // Generating a nested body moves the builder's insert
                    // point into it; `build_function_body` restores it, so
                    // the next local in this scope picks up right here.
                }
            }
        }

        for stmt in &func.body {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn zero_initialize(
        &self,
        ptr: inkwell::values::PointerValue<'ctx>,
        ty: &Type,
        span: crate::token::Span,
    ) -> Result<(), CodegenError> {
        let zero: BasicValueEnum = match ty {
            Type::Int => self.context.i32_type().const_zero().into(),
            Type::Char => self.context.i8_type().const_zero().into(),
            Type::Bool => self.context.bool_type().const_zero().into(),
            Type::Array(_) | Type::List(_) | Type::Nil => self
                .context
                .ptr_type(AddressSpace::default())
                .const_null()
                .into(),
            Type::Void | Type::Function { .. } => return Ok(()),
        };
        self.builder
            .build_store(ptr, zero)
            .map_err(|e| CodegenError::new(e.to_string(), span))?;
        Ok(())
    }
}
