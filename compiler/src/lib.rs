//! The Tony programming language compiler, as a library.
//!
//! Exposes the full front-to-back pipeline — [`lexer`], [`parser`],
//! [`semantic`] analysis, and [`codegen`] — plus [`linker`] for resolving and
//! invoking the system linker against the Tony runtime. The CLI binary
//! (`src/main.rs`) wires these together in [`driver`], which stays
//! crate-private to the binary since it orchestrates process execution
//! (`llc`, the linker, the built executable) rather than exposing a library
//! surface.

pub mod ast;
pub mod codegen;
pub mod lexer;
pub mod linker;
pub mod parser;
pub mod semantic;
pub mod token;
