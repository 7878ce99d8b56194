//! Pretty-printer used by `tonyc --ast` and by tests that check the parser
//! round-trips a program into readable source-like text.
//!
//! This is not required to reproduce the original source byte-for-byte —
//! only to render a tree that re-parses to the same shape.

use super::def::{Def, FuncDecl, FuncDef, Header, Param, Program, VarDef};
use super::expr::{BinaryOp, Expr, ExprKind, UnaryOp};
use super::stmt::{IfArm, SimpleStmt, Stmt, StmtKind};
use super::types::Type;
use std::fmt::Write as _;

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    print_funcdef(&mut out, &program.main, 0);
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn print_type(out: &mut String, ty: &Type) {
    let _ = write!(out, "{}", ty);
}

fn print_header(out: &mut String, header: &Header) {
    if header.return_type != Type::Void {
        print_type(out, &header.return_type);
        out.push(' ');
    }
    out.push_str(&header.name);
    out.push('(');
    for (i, p) in header.params.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        print_param(out, p);
    }
    out.push(')');
}

fn print_param(out: &mut String, p: &Param) {
    if p.by_ref {
        out.push_str("ref ");
    }
    print_type(out, &p.ty);
    out.push(' ');
    out.push_str(&p.name);
}

fn print_funcdef(out: &mut String, f: &FuncDef, level: usize) {
    indent(out, level);
    out.push_str("def ");
    print_header(out, &f.header);
    out.push_str(" :\n");
    for def in &f.locals {
        print_def(out, def, level + 1);
    }
    for stmt in &f.body {
        print_stmt(out, stmt, level + 1);
    }
    indent(out, level);
    out.push_str("end\n");
}

fn print_def(out: &mut String, def: &Def, level: usize) {
    match def {
        Def::Var(v) => print_vardef(out, v, level),
        Def::Decl(d) => print_funcdecl(out, d, level),
        Def::Func(f) => print_funcdef(out, f, level),
    }
}

fn print_vardef(out: &mut String, v: &VarDef, level: usize) {
    indent(out, level);
    print_type(out, &v.ty);
    out.push(' ');
    out.push_str(&v.names.join(", "));
    out.push('\n');
}

fn print_funcdecl(out: &mut String, d: &FuncDecl, level: usize) {
    indent(out, level);
    out.push_str("decl ");
    print_header(out, &d.header);
    out.push('\n');
}

fn print_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    match &stmt.kind {
        StmtKind::Skip => {
            indent(out, level);
            out.push_str("skip\n");
        }
        StmtKind::Assign { target, value } => {
            indent(out, level);
            print_expr(out, target);
            out.push_str(" := ");
            print_expr(out, value);
            out.push('\n');
        }
        StmtKind::Call(e) => {
            indent(out, level);
            print_expr(out, e);
            out.push('\n');
        }
        StmtKind::If { arms, else_body } => {
            for (i, arm) in arms.iter().enumerate() {
                indent(out, level);
                out.push_str(if i == 0 { "if " } else { "elsif " });
                print_expr(out, &arm.condition);
                out.push_str(" :\n");
                for s in &arm.body {
                    print_stmt(out, s, level + 1);
                }
            }
            if let Some(body) = else_body {
                indent(out, level);
                out.push_str("else :\n");
                for s in body {
                    print_stmt(out, s, level + 1);
                }
            }
            indent(out, level);
            out.push_str("end\n");
        }
        StmtKind::For {
            init,
            condition,
            step,
            body,
        } => {
            indent(out, level);
            out.push_str("for ");
            print_simple_list(out, init);
            out.push_str(" ; ");
            print_expr(out, condition);
            out.push_str(" ; ");
            print_simple_list(out, step);
            out.push_str(" :\n");
            for s in body {
                print_stmt(out, s, level + 1);
            }
            indent(out, level);
            out.push_str("end\n");
        }
        StmtKind::Return(value) => {
            indent(out, level);
            out.push_str("return");
            if let Some(v) = value {
                out.push(' ');
                print_expr(out, v);
            }
            out.push('\n');
        }
        StmtKind::Exit => {
            indent(out, level);
            out.push_str("exit\n");
        }
    }
}

fn print_simple_list(out: &mut String, items: &[SimpleStmt]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        print_simple(out, item);
    }
}

fn print_simple(out: &mut String, item: &SimpleStmt) {
    match item {
        SimpleStmt::Skip => out.push_str("skip"),
        SimpleStmt::Assign { target, value } => {
            print_expr(out, target);
            out.push_str(" := ");
            print_expr(out, value);
        }
        SimpleStmt::Call(e) => print_expr(out, e),
    }
}

fn print_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::IntLiteral(v) => {
            let _ = write!(out, "{}", v);
        }
        ExprKind::CharLiteral(c) => {
            let _ = write!(out, "'{}'", *c as char);
        }
        ExprKind::BoolLiteral(b) => out.push_str(if *b { "true" } else { "false" }),
        ExprKind::NilLiteral => out.push_str("nil"),
        ExprKind::StringLiteral(bytes) => {
            out.push('"');
            out.push_str(&String::from_utf8_lossy(bytes));
            out.push('"');
        }
        ExprKind::Identifier(name) => out.push_str(name),
        ExprKind::Paren(inner) => {
            out.push('(');
            print_expr(out, inner);
            out.push(')');
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(unary_op_str(*op));
            if matches!(op, UnaryOp::Not) {
                out.push(' ');
            }
            print_expr(out, operand);
        }
        ExprKind::Binary { op, left, right } => {
            print_expr(out, left);
            let _ = write!(out, " {} ", binary_op_str(*op));
            print_expr(out, right);
        }
        ExprKind::New { elem_ty, size } => {
            out.push_str("new ");
            print_type(out, elem_ty);
            out.push('[');
            print_expr(out, size);
            out.push(']');
        }
        ExprKind::Head(e) => {
            out.push_str("head(");
            print_expr(out, e);
            out.push(')');
        }
        ExprKind::Tail(e) => {
            out.push_str("tail(");
            print_expr(out, e);
            out.push(')');
        }
        ExprKind::IsNil(e) => {
            out.push_str("nil?(");
            print_expr(out, e);
            out.push(')');
        }
        ExprKind::Index { array, index } => {
            print_expr(out, array);
            out.push('[');
            print_expr(out, index);
            out.push(']');
        }
        ExprKind::Call { callee, args } => {
            out.push_str(callee);
            out.push('(');
            for (i, a) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_expr(out, a);
            }
            out.push(')');
        }
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Not => "not",
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "mod",
        BinaryOp::Eq => "=",
        BinaryOp::NotEq => "<>",
        BinaryOp::Less => "<",
        BinaryOp::Greater => ">",
        BinaryOp::LessEq => "<=",
        BinaryOp::GreaterEq => ">=",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
        BinaryOp::Cons => "#",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    #[test]
    fn prints_trivial_main() {
        let header = Header::new("main".to_string(), Type::Void, vec![], Span::dummy());
        let main = FuncDef {
            header,
            locals: vec![],
            body: vec![Stmt::new(StmtKind::Skip, Span::dummy())],
            span: Span::dummy(),
        };
        let program = Program { main };
        let rendered = print_program(&program);
        assert!(rendered.starts_with("def main() :\n"));
        assert!(rendered.contains("    skip\n"));
        assert!(rendered.ends_with("end\n"));
    }

    #[test]
    fn prints_assignment_and_binary_expr() {
        let target = Expr::new(ExprKind::Identifier("x".into()), Span::dummy());
        let value = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::new(ExprKind::Identifier("x".into()), Span::dummy())),
                right: Box::new(Expr::new(ExprKind::IntLiteral(1), Span::dummy())),
            },
            Span::dummy(),
        );
        let stmt = Stmt::new(StmtKind::Assign { target, value }, Span::dummy());
        let mut out = String::new();
        print_stmt(&mut out, &stmt, 0);
        assert_eq!(out, "x := x + 1\n");
    }
}
