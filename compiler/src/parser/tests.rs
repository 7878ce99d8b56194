use super::*;
use crate::ast::{Def, ExprKind, StmtKind, Type, print_program};
use crate::lexer::Lexer;

fn parse_src(src: &str) -> Program {
    let tokens = Lexer::new(src).tokenize().expect("lex should succeed");
    parse(tokens).expect("parse should succeed")
}

fn parse_src_err(src: &str) -> SyntaxError {
    let tokens = Lexer::new(src).tokenize().expect("lex should succeed");
    parse(tokens).expect_err("parse should fail")
}

#[test]
fn parses_minimal_main() {
    let program = parse_src("def main() : skip end");
    assert_eq!(program.main.header.name, "main");
    assert_eq!(program.main.header.return_type, Type::Void);
    assert!(program.main.header.params.is_empty());
    assert_eq!(program.main.body.len(), 1);
    assert!(matches!(program.main.body[0].kind, StmtKind::Skip));
}

#[test]
fn parses_header_with_return_type_and_formals() {
    let program = parse_src(
        "def int add(int a, b; ref char[] s) :
             return a
         end",
    );
    let header = &program.main.header;
    assert_eq!(header.name, "add");
    assert_eq!(header.return_type, Type::Int);
    assert_eq!(header.params.len(), 3);
    assert_eq!(header.params[0].name, "a");
    assert_eq!(header.params[0].ty, Type::Int);
    assert!(!header.params[0].by_ref);
    assert_eq!(header.params[1].name, "b");
    assert_eq!(header.params[2].name, "s");
    assert!(header.params[2].by_ref);
    assert_eq!(header.params[2].ty, Type::array_of(Type::Char));
}

#[test]
fn parses_local_vardef_decl_and_nested_def() {
    let program = parse_src(
        "def main() :
             int x, y
             decl bool helper(int n)
             def bool helper(int n) :
                 return true
             end
             skip
         end",
    );
    assert_eq!(program.main.locals.len(), 3);
    assert!(matches!(program.main.locals[0], Def::Var(_)));
    assert!(matches!(program.main.locals[1], Def::Decl(_)));
    assert!(matches!(program.main.locals[2], Def::Func(_)));
}

#[test]
fn parses_nested_array_and_list_types() {
    let program = parse_src(
        "def main() :
             int[][] matrix
             list [int] xs
             skip
         end",
    );
    let Def::Var(matrix) = &program.main.locals[0] else {
        panic!("expected var def");
    };
    assert_eq!(matrix.ty, Type::array_of(Type::array_of(Type::Int)));
    let Def::Var(xs) = &program.main.locals[1] else {
        panic!("expected var def");
    };
    assert_eq!(xs.ty, Type::list_of(Type::Int));
}

#[test]
fn parses_if_elsif_else() {
    let program = parse_src(
        "def main() :
             if true :
                 skip
             elsif false :
                 skip
             else :
                 skip
             end
         end",
    );
    let StmtKind::If { arms, else_body } = &program.main.body[0].kind else {
        panic!("expected if");
    };
    assert_eq!(arms.len(), 2);
    assert!(else_body.is_some());
}

#[test]
fn parses_for_loop() {
    let program = parse_src(
        "def main() :
             int i
             for i := 0 ; i < 10 ; i := i + 1 :
                 skip
             end
         end",
    );
    let StmtKind::For { init, step, .. } = &program.main.body[0].kind else {
        panic!("expected for");
    };
    assert_eq!(init.len(), 1);
    assert_eq!(step.len(), 1);
}

#[test]
fn parses_assignment_and_call_statements() {
    let program = parse_src(
        "def main() :
             int x
             x := 1
             puti(x)
         end",
    );
    assert!(matches!(program.main.body[0].kind, StmtKind::Assign { .. }));
    assert!(matches!(program.main.body[1].kind, StmtKind::Call(_)));
}

#[test]
fn rejects_assignment_to_non_lvalue() {
    let err = parse_src_err(
        "def main() :
             1 := 2
         end",
    );
    assert!(err.message().contains("':='"));
}

#[test]
fn parses_binary_precedence_additive_over_comparison() {
    let program = parse_src(
        "def main() :
             if 1 + 2 < 3 * 4 :
                 skip
             end
         end",
    );
    let StmtKind::If { arms, .. } = &program.main.body[0].kind else {
        panic!("expected if");
    };
    let ExprKind::Binary { op, left, right } = &arms[0].condition.kind else {
        panic!("expected binary comparison");
    };
    assert_eq!(*op, crate::ast::BinaryOp::Less);
    assert!(matches!(left.kind, ExprKind::Binary { op: crate::ast::BinaryOp::Add, .. }));
    assert!(matches!(right.kind, ExprKind::Binary { op: crate::ast::BinaryOp::Mul, .. }));
}

#[test]
fn cons_is_right_associative() {
    let program = parse_src(
        "def main() :
             list [int] xs
             xs := 1 # 2 # nil
         end",
    );
    let StmtKind::Assign { value, .. } = &program.main.body[0].kind else {
        panic!("expected assign");
    };
    let ExprKind::Binary { op, left, right } = &value.kind else {
        panic!("expected cons");
    };
    assert_eq!(*op, crate::ast::BinaryOp::Cons);
    assert!(matches!(left.kind, ExprKind::IntLiteral(1)));
    assert!(matches!(right.kind, ExprKind::Binary { op: crate::ast::BinaryOp::Cons, .. }));
}

#[test]
fn unary_minus_binds_tighter_than_multiplication() {
    let program = parse_src(
        "def main() :
             int x
             x := -2 * 3
         end",
    );
    let StmtKind::Assign { value, .. } = &program.main.body[0].kind else {
        panic!("expected assign");
    };
    let ExprKind::Binary { op, left, .. } = &value.kind else {
        panic!("expected mul");
    };
    assert_eq!(*op, crate::ast::BinaryOp::Mul);
    assert!(matches!(left.kind, ExprKind::Unary { op: crate::ast::UnaryOp::Neg, .. }));
}

#[test]
fn parses_new_array_and_index() {
    let program = parse_src(
        "def main() :
             int[] a
             a := new int [10]
             a[0] := 5
         end",
    );
    let StmtKind::Assign { value, .. } = &program.main.body[0].kind else {
        panic!("expected assign");
    };
    assert!(matches!(value.kind, ExprKind::New { .. }));
    let StmtKind::Assign { target, .. } = &program.main.body[1].kind else {
        panic!("expected assign");
    };
    assert!(matches!(target.kind, ExprKind::Index { .. }));
}

#[test]
fn parses_head_tail_and_nil_question() {
    let program = parse_src(
        "def main() :
             list [int] xs
             int h
             h := head(xs)
             xs := tail(xs)
             if nil?(xs) :
                 skip
             end
         end",
    );
    assert!(matches!(
        program.main.body[0].kind,
        StmtKind::Assign { .. }
    ));
    let StmtKind::Assign { value, .. } = &program.main.body[0].kind else {
        unreachable!()
    };
    assert!(matches!(value.kind, ExprKind::Head(_)));
}

#[test]
fn rejects_unexpected_token() {
    let err = parse_src_err("def main() skip end");
    assert!(err.message().contains("expected ':'"));
}

#[test]
fn rejects_empty_block() {
    let err = parse_src_err("def main() : end");
    assert!(err.message().contains("at least one statement"));
}

#[test]
fn print_program_round_trips_through_parser() {
    let program = parse_src(
        "def main() :
             int x
             x := 1 + 2
             return
         end",
    );
    let rendered = print_program(&program);
    let tokens = Lexer::new(&rendered).tokenize().expect("re-lex should succeed");
    let reparsed = parse(tokens).expect("re-parse should succeed");
    assert_eq!(reparsed.main.header.name, "main");
    assert_eq!(reparsed.main.body.len(), 2);
}
