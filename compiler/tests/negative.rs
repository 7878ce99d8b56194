//! Programs that must be rejected, one per diagnostic category named in
//! the error-handling design (declaration, arity, type, name, control
//! flow). Each test checks the failing phase and the semantic error's
//! kind rather than the rendered message, since messages are free to
//! change wording.

mod common;

use common::check;
use tonyc::semantic::SemanticErrorKind;

fn semantic_kind(source: &str) -> SemanticErrorKind {
    let tokens = tonyc::lexer::Lexer::new(source).tokenize().expect("lex");
    let program = tonyc::parser::parse(tokens).expect("parse");
    let err = tonyc::semantic::analyze(&program).expect_err("program should be rejected");
    err.kind()
}

#[test]
fn calling_a_declared_but_undefined_function_is_a_declaration_error() {
    let err = semantic_kind(
        r#"
        def main ()
            decl int helper (int n)
        :
            puti(helper(1))
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::Declaration);
}

#[test]
fn too_many_arguments_is_an_arity_error() {
    let err = semantic_kind(
        r#"
        def main ()
            def add (int a; int b) :
                return a + b
            end
        :
            puti(add(1, 2, 3))
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::Arity);
}

#[test]
fn assigning_bool_to_int_is_a_type_error() {
    let err = semantic_kind(
        r#"
        def main ()
            int x
        :
            x := true
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::Type);
}

#[test]
fn using_a_name_before_its_declaration_is_a_name_error() {
    let err = semantic_kind(
        r#"
        def main () :
            puti(y)
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::Name);
}

#[test]
fn a_non_void_function_falling_off_the_end_is_a_control_flow_error() {
    let err = semantic_kind(
        r#"
        def main ()
            def int always_one () :
                skip
            end
        :
            puti(always_one())
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::ControlFlow);
}

#[test]
fn exit_inside_a_non_void_function_is_a_control_flow_error() {
    let err = semantic_kind(
        r#"
        def main ()
            def int always_one () :
                exit
                return 1
            end
        :
            puti(always_one())
        end
        "#,
    );
    assert_eq!(err, SemanticErrorKind::ControlFlow);
}

#[test]
fn a_well_formed_program_is_accepted() {
    check("def main () : puti(1) end").expect("a simple valid program should pass analysis");
}
