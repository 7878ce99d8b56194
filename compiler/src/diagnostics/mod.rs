//! Pretty, source-highlighted error reporting, built on `ariadne`.
//!
//! Every front-end error (lexer, parser, semantic analyzer, codegen) carries
//! a [`tonyc::token::Span`], so each gets a highlighted snippet; back-end
//! failures (`llc`, the linker) carry no span and are reported as a plain
//! message, since they describe an external process, not a location in the
//! source.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use tonyc::semantic::SemanticErrorKind;
use tonyc::token::Span;

use crate::driver::CompileError;

fn print_range_report(
    filename: &str,
    source: &str,
    span_range: Range<usize>,
    short_message: &str,
    label_message: &str,
) -> std::io::Result<()> {
    Report::build(ReportKind::Error, (filename, span_range.clone()))
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(short_message)
        .with_label(
            Label::new((filename, span_range))
                .with_message(label_message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
}

/// The label shown next to the highlighted span — `message()` for most
/// kinds, except `NameError`, which reads better phrased as a complaint
/// about the name itself.
fn label_for_semantic(kind: SemanticErrorKind, message: &str) -> String {
    match kind {
        SemanticErrorKind::Name => message.to_string(),
        _ => message.to_string(),
    }
}

fn report_spanned(filename: &str, source: &str, span: Span, short_message: &str, message: &str) {
    if let Err(report_err) = print_range_report(filename, source, span.start..span.end, short_message, message) {
        eprintln!("{}: {} (at {}:{})", short_message, message, span.line, span.column);
        eprintln!("(failed to display detailed error report: {})", report_err);
    }
}

pub(crate) fn report_error(filename: &str, source: &str, error: &CompileError) {
    match error {
        CompileError::Lex(e) => report_spanned(filename, source, e.span(), e.short_message(), e.message()),
        CompileError::Syntax(e) => report_spanned(filename, source, e.span(), "syntax error", e.message()),
        CompileError::Semantic(e) => {
            let label = label_for_semantic(e.kind(), e.message());
            report_spanned(filename, source, e.span(), error.category(), &label);
        }
        CompileError::Codegen(e) => match e.span {
            Some(span) => report_spanned(filename, source, span, "internal compiler error", &e.message),
            None => eprintln!("internal compiler error: {}", e.message),
        },
        CompileError::LlcSpawnError(_)
        | CompileError::LlcFailed { .. }
        | CompileError::Link(_)
        | CompileError::FileReadError { .. }
        | CompileError::TempDirCreationError(_)
        | CompileError::PathNotUtf8 { .. }
        | CompileError::FilenameError { .. } => {
            eprintln!("{}: {}", error.category(), error);
        }
    }
}
