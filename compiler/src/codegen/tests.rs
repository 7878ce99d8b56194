//! Unit tests for code generation.
//!
//! Each test runs the full lex → parse → analyze → codegen pipeline over a
//! small snippet and inspects the resulting textual IR, rather than hand
//! building AST nodes — the annotations codegen depends on (`extra_params`,
//! resolved `Type`s) only exist once semantic analysis has run.

use inkwell::context::Context;

use crate::lexer::Lexer;
use crate::parser;
use crate::semantic;

use super::Codegen;

fn compile(source: &str) -> String {
    let tokens = Lexer::new(source).tokenize().expect("lex");
    let program = parser::parse(tokens).expect("parse");
    semantic::analyze(&program).expect("analyze");
    let context = Context::create();
    let mut codegen = Codegen::new(&context, "test_module");
    codegen.compile(&program).expect("codegen");
    codegen.ir_to_string()
}

#[test]
fn test_codegen_new_creates_empty_module_named() {
    let context = Context::create();
    let codegen = Codegen::new(&context, "test_module");
    assert!(codegen.ir_to_string().contains("test_module"));
}

#[test]
fn test_empty_main_emits_tony_main_and_c_main() {
    let ir = compile("def main () : skip end");
    assert!(ir.contains("define void @tony_main()"));
    assert!(ir.contains("define i32 @main()"));
    assert!(ir.contains("call void @tony_main()"));
}

#[test]
fn test_arithmetic_lowers_to_i32_ops() {
    let ir = compile(
        r#"
        def main () :
            int x
            x := (1 + 2) * 3
            puti(x)
        end
        "#,
    );
    assert!(ir.contains("add i32"));
    assert!(ir.contains("mul i32"));
    assert!(ir.contains("call void @puti"));
}

#[test]
fn test_array_new_and_index_use_alloca_and_gep() {
    let ir = compile(
        r#"
        def main () :
            int [] a
            int n
            n := 5
            a := new int [n]
            a[0] := 7
            puti(a[0])
        end
        "#,
    );
    assert!(ir.contains("alloca"), "array backing store should be stack-allocated");
    assert!(ir.contains("getelementptr"));
}

#[test]
fn test_list_cons_head_use_named_cell_struct_and_malloc() {
    let ir = compile(
        r#"
        def main () :
            list [int] l
            l := 1 # nil
            puti(head(l))
        end
        "#,
    );
    assert!(ir.contains("list.int"));
    assert!(ir.contains("@malloc"));
}

#[test]
fn test_nested_function_capture_adds_extra_by_ref_param() {
    let ir = compile(
        r#"
        def main () :
            int x
            def inner () :
                puti(x)
            end

            x := 10
            inner()
        end
        "#,
    );
    // the captured `x` should surface as an extra pointer parameter on
    // the nested function's definition.
    assert!(ir.contains("define void @tony_main.inner(ptr"));
}

#[test]
fn test_mutual_recursion_resolves_both_directions() {
    let ir = compile(
        r#"
        def main () :
            decl bool is_even (int n)
            def bool is_odd (int n) :
                if n = 0 : return false
                else : return is_even(n - 1)
                end
            end
            def bool is_even (int n) :
                if n = 0 : return true
                else : return is_odd(n - 1)
                end
            end

            skip
        end
        "#,
    );
    assert!(ir.contains("define i1 @tony_main.is_even(i32"));
    assert!(ir.contains("define i1 @tony_main.is_odd(i32"));
    assert!(ir.contains("call i1 @tony_main.is_even"));
    assert!(ir.contains("call i1 @tony_main.is_odd"));
}

#[test]
fn test_runtime_functions_declared_without_bodies() {
    let ir = compile(r#"def main () : puti(1) putb(true) puts("hi") end"#);
    assert!(ir.contains("declare void @puti(i32)"));
    assert!(ir.contains("declare void @putb(i1)"));
    assert!(ir.contains("declare void @puts(ptr)"));
    assert!(ir.contains("declare i32 @geti()"));
    assert!(ir.contains("declare i32 @strcmp(ptr, ptr)"));
}

#[test]
fn test_by_ref_parameter_passes_pointer() {
    let ir = compile(
        r#"
        def main () :
            def swap (ref int a; ref int b) :
                int t
                t := a
                a := b
                b := t
            end
            int x
            int y

            x := 1
            y := 2
            swap(x, y)
        end
        "#,
    );
    assert!(ir.contains("define void @tony_main.swap(ptr, ptr)"));
}
