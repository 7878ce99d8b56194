//! The Tony programming language compiler CLI.
//!
//! `tonyc` compiles a single `.tony` file (or, with `-f`/`-i`, a program
//! read from standard input) straight through to a native executable.
//! There is no separate "run" step — unlike some of this compiler's
//! siblings, `tonyc` never executes the program it builds.

use std::io::Read;

use clap::Parser;

mod diagnostics;
mod driver;

/// Command-line interface for the Tony compiler.
#[derive(Parser)]
#[command(name = "tonyc")]
#[command(about = "The Tony programming language", long_about = None)]
struct Cli {
    /// The source file to compile (e.g. `hello.tony`). Omitted when `-f` or
    /// `-i` is given, since those read the program from standard input.
    file: Option<String>,

    /// Read source from standard input and print the final assembly to
    /// standard output. Keeps no artifact files.
    #[arg(short = 'f', action = clap::ArgAction::SetTrue)]
    stdin_assembly: bool,

    /// Read source from standard input and print the generated LLVM IR to
    /// standard output. Keeps no artifact files.
    #[arg(short = 'i', action = clap::ArgAction::SetTrue)]
    stdin_ir: bool,

    /// LLVM optimization level passed to `llc` (default 1; write `-O2` or
    /// `-O3` to raise it).
    #[arg(short = 'O', default_value_t = 1)]
    opt_level: u8,

    /// Pretty-print the AST to standard output and exit, before semantic
    /// analysis runs.
    #[arg(long)]
    ast: bool,

    /// Echo each invoked back-end command (`llc`, the linker).
    #[arg(long)]
    commands: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.stdin_assembly && cli.stdin_ir {
        eprintln!("error: -f and -i cannot be used together");
        std::process::exit(1);
    }
    if cli.file.is_some() && (cli.stdin_assembly || cli.stdin_ir) {
        eprintln!("error: a source file and -f/-i cannot be used together");
        std::process::exit(1);
    }
    if cli.file.is_none() && !cli.stdin_assembly && !cli.stdin_ir {
        eprintln!("error: no input given; pass a source file or use -f/-i");
        std::process::exit(1);
    }

    if cli.ast {
        run_ast_mode(cli.file.as_deref());
        return;
    }

    if cli.stdin_ir || cli.stdin_assembly {
        let source = read_stdin_or_exit();
        let mode = if cli.stdin_ir {
            driver::TransientMode::Ir
        } else {
            driver::TransientMode::Assembly
        };
        match driver::build_transient(source, mode, cli.opt_level, cli.commands) {
            Ok(output) => print!("{}", output),
            Err(error) => report_and_exit(*error),
        }
        return;
    }

    let file = cli.file.expect("checked above: file is Some when neither -f nor -i is set");
    if let Err(error) = driver::build(&file, cli.opt_level, cli.commands) {
        report_and_exit(*error);
    }
}

fn read_stdin_or_exit() -> String {
    let mut source = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut source) {
        eprintln!("error: failed to read standard input: {}", e);
        std::process::exit(1);
    }
    source
}

/// Handles `--ast`: lexing and parsing only, with no semantic analysis or
/// codegen, printing the resulting tree and exiting.
fn run_ast_mode(file: Option<&str>) {
    let (filename, source) = match file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(source) => (path.to_string(), source),
            Err(e) => {
                eprintln!("error: failed to read file '{}': {}", path, e);
                std::process::exit(1);
            }
        },
        None => ("<stdin>".to_string(), read_stdin_or_exit()),
    };

    let tokens = match tonyc::lexer::Lexer::new(&source).tokenize() {
        Ok(tokens) => tokens,
        Err(e) => {
            diagnostics::report_error(&filename, &source, &driver::CompileError::Lex(e));
            std::process::exit(1);
        }
    };

    let program = match tonyc::parser::parse(tokens) {
        Ok(program) => program,
        Err(e) => {
            diagnostics::report_error(&filename, &source, &driver::CompileError::Syntax(e));
            std::process::exit(1);
        }
    };

    println!("{}", tonyc::ast::print_program(&program));
}

fn report_and_exit(error: driver::CompileErrorWithContext) -> ! {
    diagnostics::report_error(error.filename(), error.source(), error.error());
    std::process::exit(1);
}
