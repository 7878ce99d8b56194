//! Orchestrates the full `tonyc` pipeline: lex, parse, analyze, emit LLVM
//! IR, then shell out to `llc` and the system linker.
//!
//! Unlike a compiler that links its own object-file writer in-process, this
//! one treats the back end as an external collaborator (spec: the assembler
//! and linker are out of scope for the front-end/IR-emitter core), so this
//! module's job is almost entirely process orchestration once codegen hands
//! back a module.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use inkwell::context::Context;
use tempfile::TempDir;
use tonyc::codegen::{Codegen, CodegenError};
use tonyc::lexer::{LexError, Lexer};
use tonyc::parser::{self, SyntaxError};
use tonyc::semantic::{self, SemanticError, SemanticErrorKind};

mod link;

pub(crate) use link::LinkError;

/// A compilation error from any phase of the pipeline.
pub(crate) enum CompileError {
    Lex(LexError),
    Syntax(SyntaxError),
    Semantic(SemanticError),
    Codegen(CodegenError),
    /// `llc` could not be started.
    LlcSpawnError(std::io::Error),
    /// `llc` exited with a non-zero status.
    LlcFailed {
        exit_code: String,
        stdout: String,
        stderr: String,
    },
    Link(LinkError),
    /// Failed to read a source file.
    FileReadError { path: String, source: std::io::Error },
    /// Failed to create a temporary directory (`-f`/`-i` mode).
    TempDirCreationError(std::io::Error),
    /// A path is not valid UTF-8.
    PathNotUtf8 { path: PathBuf, context: &'static str },
    /// Cannot determine an output filename from the input path.
    FilenameError { path: String, reason: &'static str },
}

impl CompileError {
    fn file_read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        CompileError::FileReadError {
            path: path.into(),
            source,
        }
    }

    fn temp_dir_creation_error(source: std::io::Error) -> Self {
        CompileError::TempDirCreationError(source)
    }

    fn path_not_utf8(path: impl Into<PathBuf>, context: &'static str) -> Self {
        CompileError::PathNotUtf8 {
            path: path.into(),
            context,
        }
    }

    fn filename_error(path: impl Into<String>, reason: &'static str) -> Self {
        CompileError::FilenameError {
            path: path.into(),
            reason,
        }
    }

    /// The spec's error-category name for this error, used by diagnostics
    /// and matching spec §7 exactly.
    pub(crate) fn category(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "LexicalError",
            CompileError::Syntax(_) => "SyntaxError",
            CompileError::Semantic(e) => match e.kind() {
                SemanticErrorKind::Declaration => "DeclarationError",
                SemanticErrorKind::Name => "NameError",
                SemanticErrorKind::Type => "TypeError",
                SemanticErrorKind::Arity => "ArityError",
                SemanticErrorKind::ControlFlow => "ControlFlowError",
            },
            CompileError::Codegen(_) => "CodegenError",
            CompileError::LlcSpawnError(_) | CompileError::LlcFailed { .. } | CompileError::Link(_) => {
                "BackendError"
            }
            CompileError::FileReadError { .. }
            | CompileError::TempDirCreationError(_)
            | CompileError::PathNotUtf8 { .. }
            | CompileError::FilenameError { .. } => "IoError",
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{}", e),
            CompileError::Syntax(e) => write!(f, "{}", e),
            CompileError::Semantic(e) => write!(f, "{}", e),
            CompileError::Codegen(e) => write!(f, "{}", e),
            CompileError::LlcSpawnError(source) => write!(f, "failed to run llc: {}", source),
            CompileError::LlcFailed {
                exit_code,
                stdout,
                stderr,
            } => {
                write!(f, "llc failed with exit code {}", exit_code)?;
                if !stdout.is_empty() {
                    write!(f, "\n[stdout]\n{}", stdout)?;
                }
                if !stderr.is_empty() {
                    write!(f, "\n[stderr]\n{}", stderr)?;
                }
                Ok(())
            }
            CompileError::Link(e) => write!(f, "{}", e),
            CompileError::FileReadError { path, source } => {
                write!(f, "failed to read file '{}': {}", path, source)
            }
            CompileError::TempDirCreationError(source) => {
                write!(f, "failed to create temporary directory: {}", source)
            }
            CompileError::PathNotUtf8 { path, context } => {
                write!(f, "{} path '{}' is not valid UTF-8", context, path.display())
            }
            CompileError::FilenameError { path, reason } => write!(f, "{}: {}", reason, path),
        }
    }
}

/// Source context carried alongside an error so diagnostics can print a
/// highlighted snippet without re-reading the file.
#[derive(Clone)]
struct CompileContext {
    filename: String,
    source: String,
}

impl CompileContext {
    fn new(filename: impl Into<String>, source: impl Into<String>) -> Self {
        CompileContext {
            filename: filename.into(),
            source: source.into(),
        }
    }

    fn with_error(self, error: CompileError) -> CompileErrorWithContext {
        CompileErrorWithContext {
            context: self,
            error,
        }
    }
}

/// A compilation error with the context needed for reporting.
pub(crate) struct CompileErrorWithContext {
    context: CompileContext,
    error: CompileError,
}

impl CompileErrorWithContext {
    pub(crate) fn filename(&self) -> &str {
        &self.context.filename
    }

    pub(crate) fn source(&self) -> &str {
        &self.context.source
    }

    pub(crate) fn error(&self) -> &CompileError {
        &self.error
    }
}

/// Formats an exit status for display, including signal information on Unix.
pub(super) fn format_exit_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        return code.to_string();
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal {}", signal);
        }
    }
    "unknown".to_string()
}

/// Renders a `Command` the way `--commands` echoes it: program name
/// followed by its arguments, space-separated.
fn format_command(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Lexes and parses `source` into a [`tonyc::ast::Program`].
fn lex_and_parse(source: &str) -> Result<tonyc::ast::Program, CompileError> {
    let tokens = Lexer::new(source).tokenize().map_err(CompileError::Lex)?;
    parser::parse(tokens).map_err(CompileError::Syntax)
}

/// Runs the full front end (lex, parse, semantic analysis) and code
/// generation, producing a [`Codegen`] holding the finished LLVM module.
fn compile_to_module<'ctx>(context: &'ctx Context, source: &str) -> Result<Codegen<'ctx>, CompileError> {
    let program = lex_and_parse(source)?;
    semantic::analyze(&program).map_err(CompileError::Semantic)?;
    let mut codegen = Codegen::new(context, "tony_module");
    codegen.compile(&program).map_err(CompileError::Codegen)?;
    Ok(codegen)
}

/// Invokes `llc` to lower `ll_path` to `s_path` at the given optimization
/// level (spec: default `1`, raised to `2`/`3` by `-O2`/`-O3`).
fn run_llc(ll_path: &Path, s_path: &Path, opt_level: u8, echo_commands: bool) -> Result<(), CompileError> {
    let ll_str = ll_path
        .to_str()
        .ok_or_else(|| CompileError::path_not_utf8(ll_path, "IR file"))?;
    let s_str = s_path
        .to_str()
        .ok_or_else(|| CompileError::path_not_utf8(s_path, "Assembly file"))?;

    let mut cmd = Command::new("llc");
    cmd.args([
        ll_str,
        "--relocation-model=pic",
        &format!("-O{}", opt_level),
        "-o",
        s_str,
    ]);

    if echo_commands {
        println!("{}", format_command(&cmd));
    }

    let output = cmd.output().map_err(CompileError::LlcSpawnError)?;
    if !output.status.success() {
        return Err(CompileError::LlcFailed {
            exit_code: format_exit_status(&output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Compiles `source` all the way to a linked executable at `out_path`,
/// writing the intermediate `.ll`/`.s` artifacts at `ll_path`/`s_path`.
fn build_artifacts(
    source: &str,
    ll_path: &Path,
    s_path: &Path,
    out_path: &Path,
    opt_level: u8,
    echo_commands: bool,
) -> Result<(), CompileError> {
    let llvm_context = Context::create();
    let codegen = compile_to_module(&llvm_context, source)?;
    codegen.write_ir_to_file(ll_path).map_err(CompileError::Codegen)?;
    run_llc(ll_path, s_path, opt_level, echo_commands)?;
    link::link(s_path, out_path, echo_commands)?;
    Ok(())
}

/// Builds a Tony source file into a native executable.
///
/// Given `foo.tony`, produces `foo.ll`, `foo.s`, and `foo.out` in the
/// current directory (spec §6) — none of them are temporary here, unlike
/// the `-f`/`-i` transient modes below.
pub(crate) fn build(
    file: &str,
    opt_level: u8,
    echo_commands: bool,
) -> Result<(), Box<CompileErrorWithContext>> {
    let source = std::fs::read_to_string(file).map_err(|e| {
        Box::new(CompileContext::new(file, "").with_error(CompileError::file_read_error(file, e)))
    })?;
    let context = CompileContext::new(file, source.clone());

    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Box::new(context.clone().with_error(CompileError::filename_error(
                file,
                "cannot determine filename from path",
            )))
        })?
        .to_string();

    let ll_path = PathBuf::from(format!("{}.ll", stem));
    let s_path = PathBuf::from(format!("{}.s", stem));
    let out_path = PathBuf::from(format!("{}.out", stem));

    build_artifacts(&source, &ll_path, &s_path, &out_path, opt_level, echo_commands)
        .map_err(|e| Box::new(context.with_error(e)))?;

    println!("Built: {}", out_path.display());
    Ok(())
}

/// What a transient (`-f`/`-i`) build should produce.
pub(crate) enum TransientMode {
    /// `-i`: print the LLVM IR.
    Ir,
    /// `-f`: print the final assembly.
    Assembly,
}

/// Compiles `source` (already read from standard input by the caller) and
/// returns the requested transient artifact as text, keeping no files
/// behind once the temporary directory this uses is dropped.
pub(crate) fn build_transient(
    source: String,
    mode: TransientMode,
    opt_level: u8,
    echo_commands: bool,
) -> Result<String, Box<CompileErrorWithContext>> {
    let context = CompileContext::new("<stdin>", source.clone());

    let result = (|| -> Result<String, CompileError> {
        let llvm_context = Context::create();
        let codegen = compile_to_module(&llvm_context, &source)?;
        match mode {
            TransientMode::Ir => Ok(codegen.ir_to_string()),
            TransientMode::Assembly => {
                let temp_dir = TempDir::new().map_err(CompileError::temp_dir_creation_error)?;
                let ll_path = temp_dir.path().join("stdin.ll");
                let s_path = temp_dir.path().join("stdin.s");
                codegen.write_ir_to_file(&ll_path).map_err(CompileError::Codegen)?;
                run_llc(&ll_path, &s_path, opt_level, echo_commands)?;
                std::fs::read_to_string(&s_path)
                    .map_err(|e| CompileError::file_read_error(s_path.display().to_string(), e))
            }
        }
    })();

    result.map_err(|e| Box::new(context.with_error(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names_match_spec() {
        assert_eq!(
            CompileError::Lex(LexError::new(
                tonyc::lexer::LexErrorKind::IllegalCharacter,
                "bad byte",
                tonyc::token::Span::dummy(),
            ))
            .category(),
            "LexicalError"
        );
        assert_eq!(
            CompileError::Semantic(SemanticError::new(
                SemanticErrorKind::Arity,
                "wrong arity",
                tonyc::token::Span::dummy(),
            ))
            .category(),
            "ArityError"
        );
    }

    #[test]
    fn test_display_filename_error() {
        let err = CompileError::filename_error("/some/path", "cannot determine filename from path");
        assert_eq!(
            err.to_string(),
            "cannot determine filename from path: /some/path"
        );
    }

    #[test]
    fn test_display_llc_failed_with_output() {
        let err = CompileError::LlcFailed {
            exit_code: "1".to_string(),
            stdout: "".to_string(),
            stderr: "bad IR".to_string(),
        };
        assert_eq!(err.to_string(), "llc failed with exit code 1\n[stderr]\nbad IR");
    }
}
