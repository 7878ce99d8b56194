//! Common test utilities for Tony integration tests.
//!
//! These drive the library's public front end directly (lex, parse,
//! analyze, emit IR) rather than invoking `llc`/the linker, since the
//! sandbox these tests run in has neither available. Checking the emitted
//! IR's shape is a reasonable stand-in for checking program behavior: a
//! call to a runtime function with the right argument in the right place
//! is the thing that would print the right output once actually linked
//! and run.

#![allow(dead_code)]

use inkwell::context::Context;
use tonyc::codegen::Codegen;
use tonyc::lexer::Lexer;
use tonyc::parser;
use tonyc::semantic;

/// Lexes, parses, and semantically analyzes `source`, returning an error
/// string on the first failing phase.
pub fn check(source: &str) -> Result<(), String> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| e.to_string())?;
    let program = parser::parse(tokens).map_err(|e| e.to_string())?;
    semantic::analyze(&program).map_err(|e| e.to_string())
}

/// Compiles `source` all the way to textual LLVM IR.
pub fn compile_to_ir(source: &str) -> Result<String, String> {
    let tokens = Lexer::new(source).tokenize().map_err(|e| e.to_string())?;
    let program = parser::parse(tokens).map_err(|e| e.to_string())?;
    semantic::analyze(&program).map_err(|e| e.to_string())?;

    let context = Context::create();
    let mut codegen = Codegen::new(&context, "e2e_test");
    codegen.compile(&program).map_err(|e| e.to_string())?;
    Ok(codegen.ir_to_string())
}
