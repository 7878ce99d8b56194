use super::*;
use crate::lexer::Lexer;
use crate::parser::parse;

fn analyze_src(src: &str) -> Result<Program, SemanticError> {
    let tokens = Lexer::new(src).tokenize().expect("lex should succeed");
    let program = parse(tokens).expect("parse should succeed");
    analyze(&program)?;
    Ok(program)
}

#[test]
fn accepts_trivial_main() {
    assert!(analyze_src("def main() : skip end").is_ok());
}

#[test]
fn resolves_local_variable() {
    let program = analyze_src(
        "def main() :
             int x
             x := 1
         end",
    )
    .unwrap();
    let StmtKind::Assign { value, .. } = &program.main.body[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.ty(), Type::Int);
}

#[test]
fn rejects_undefined_name() {
    let err = analyze_src("def main() : x := 1 end").unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Name);
}

#[test]
fn rejects_type_mismatch_in_assignment() {
    let err = analyze_src(
        "def main() :
             int x
             x := 'a'
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Type);
}

#[test]
fn rejects_wrong_arity_call() {
    let err = analyze_src(
        "def main() :
             decl int add(int a, b)
             int y
             y := add(1)
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Arity);
}

#[test]
fn rejects_unfulfilled_decl() {
    let err = analyze_src(
        "def main() :
             decl int helper(int a)
             skip
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Declaration);
}

#[test]
fn accepts_exit_in_void_function_with_no_enclosing_loop() {
    assert!(analyze_src("def main() : exit end").is_ok());
}

#[test]
fn accepts_exit_inside_for() {
    assert!(analyze_src(
        "def main() :
             int i
             for i := 0; i < 10; i := i + 1 :
                 exit
             end
         end",
    )
    .is_ok());
}

#[test]
fn rejects_exit_in_a_non_void_function() {
    let err = analyze_src(
        "def main() :
             def int f() :
                 exit
                 return 1
             end
             skip
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::ControlFlow);
}

#[test]
fn rejects_missing_return_path() {
    let err = analyze_src(
        "def main() :
             def int f() :
                 if true :
                     return 1
                 end
             end
             skip
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::ControlFlow);
}

#[test]
fn accepts_return_covering_if_and_else() {
    assert!(analyze_src(
        "def main() :
             def int f(bool b) :
                 if b :
                     return 1
                 else :
                     return 2
                 end
             end
             skip
         end",
    )
    .is_ok());
}

#[test]
fn nested_function_captures_enclosing_variable() {
    let program = analyze_src(
        "def main() :
             int total
             def void bump() :
                 total := total + 1
             end
             total := 0
             bump()
         end",
    )
    .unwrap();
    let Def::Func(bump) = &program.main.locals[1] else {
        panic!("expected nested function definition");
    };
    assert_eq!(bump.header.extra_params(), vec!["total".to_string()]);
}

#[test]
fn capture_threads_through_doubly_nested_function() {
    let program = analyze_src(
        "def main() :
             int total
             def void outer() :
                 def void inner() :
                     total := total + 1
                 end
                 inner()
             end
             total := 0
             outer()
         end",
    )
    .unwrap();
    let Def::Func(outer) = &program.main.locals[1] else {
        panic!("expected nested function definition");
    };
    assert_eq!(outer.header.extra_params(), vec!["total".to_string()]);
    let Def::Func(inner) = &outer.locals[0] else {
        panic!("expected doubly nested function definition");
    };
    assert_eq!(inner.header.extra_params(), vec!["total".to_string()]);
}

#[test]
fn cons_and_head_round_trip_through_a_list() {
    let program = analyze_src(
        "def main() :
             list [int] xs
             int h
             xs := 1 # nil
             h := head(xs)
         end",
    )
    .unwrap();
    let StmtKind::Assign { value, .. } = &program.main.body[1].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.ty(), Type::Int);
}

#[test]
fn head_of_bare_nil_is_ambiguous() {
    let err = analyze_src(
        "def main() :
             int h
             h := head(nil)
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Type);
}

#[test]
fn rejects_passing_non_lvalue_by_reference() {
    let err = analyze_src(
        "def main() :
             decl void bump(ref int x)
             def void bump(ref int x) :
                 x := x + 1
             end
             bump(1 + 1)
         end",
    )
    .unwrap_err();
    assert_eq!(err.kind(), SemanticErrorKind::Type);
}

#[test]
fn mutual_recursion_via_forward_declaration_resolves() {
    assert!(analyze_src(
        "def main() :
             decl bool is_even(int n)
             def bool is_odd(int n) :
                 if n = 0 :
                     return false
                 end
                 return is_even(n - 1)
             end
             def bool is_even(int n) :
                 if n = 0 :
                     return true
                 end
                 return is_odd(n - 1)
             end
             skip
         end",
    )
    .is_ok());
}
