//! Recursive-descent parser for the Tony programming language.
//!
//! Tony's grammar is small and mostly unambiguous by its keyword leaders
//! (`if`, `for`, `decl`, `def`, a type keyword...), so a hand-written
//! recursive-descent parser reads more directly than a generated table
//! would, and it gives precise, single-token-lookahead error spans for
//! free. Binary expressions are parsed with one function per precedence
//! level (see [`expr`]) rather than a generic precedence-climbing loop,
//! matching the fixed, small operator table in play here.
//!
//! There is no error recovery: the first unexpected token raises a
//! [`SyntaxError`] and parsing stops (spec "no recovery" policy for all
//! front-end errors).
//!
//! - [`error`] — [`SyntaxError`]
//! - `expr` — expression-level parsing (test-only split point; see the
//!   `impl` block in this module for statement/definition parsing)

mod error;

#[cfg(test)]
mod tests;

pub use error::SyntaxError;

use crate::ast::{
    Def, FuncDecl, FuncDef, Header, IfArm, Param, Program, SimpleStmt, Stmt, StmtKind, Type,
    VarDef,
};
use crate::token::{Span, Token, TokenKind};

/// Parses a complete token stream (as produced by [`crate::lexer::Lexer`])
/// into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    let mut parser = Parser::new(tokens);
    let main = parser.parse_funcdef()?;
    parser.expect(&TokenKind::Eof, "end of input after main function")?;
    Ok(Program { main })
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::unexpected(self.current_kind(), expected, self.current_span()))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), SyntaxError> {
        let span = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name, span))
            }
            other => Err(SyntaxError::unexpected(&other, "an identifier", span)),
        }
    }

    // ---- definitions -------------------------------------------------

    fn parse_funcdef(&mut self) -> Result<FuncDef, SyntaxError> {
        let start = self.current_span();
        self.expect(&TokenKind::Def, "'def'")?;
        let header = self.parse_header()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let locals = self.parse_local_defs()?;
        let body = self.parse_stmt_list()?;
        let end_span = self.expect(&TokenKind::End, "'end'")?.span;
        Ok(FuncDef {
            header,
            locals,
            body,
            span: start.to(end_span),
        })
    }

    fn parse_header(&mut self) -> Result<Header, SyntaxError> {
        let start = self.current_span();
        let return_type = if self.starts_type() {
            self.parse_type()?
        } else {
            Type::Void
        };
        let (name, _) = self.expect_identifier()?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_formals()?;
        let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
        Ok(Header::new(name, return_type, params, start.to(end_span)))
    }

    fn parse_formals(&mut self) -> Result<Vec<Param>, SyntaxError> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            self.parse_formal_group(&mut params)?;
            if self.check(&TokenKind::Semicolon) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(params)
    }

    fn parse_formal_group(&mut self, out: &mut Vec<Param>) -> Result<(), SyntaxError> {
        let group_start = self.current_span();
        let by_ref = if self.check(&TokenKind::Ref) {
            self.advance();
            true
        } else {
            false
        };
        let ty = self.parse_type()?;
        let (first_name, first_span) = self.expect_identifier()?;
        out.push(Param {
            name: first_name,
            ty: ty.clone(),
            by_ref,
            span: group_start.to(first_span),
        });
        while self.check(&TokenKind::Comma) {
            self.advance();
            let (name, span) = self.expect_identifier()?;
            out.push(Param {
                name,
                ty: ty.clone(),
                by_ref,
                span,
            });
        }
        Ok(())
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Int | TokenKind::Char | TokenKind::Bool | TokenKind::List
        )
    }

    /// Parses a type, including any trailing `[]` array-of suffixes.
    fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        let mut ty = self.parse_base_type()?;
        while self.check(&TokenKind::LBracket) {
            self.advance();
            self.expect(&TokenKind::RBracket, "']' closing an array type")?;
            ty = Type::array_of(ty);
        }
        Ok(ty)
    }

    /// Parses a type with no array suffix — used after `new`, where the
    /// brackets that follow belong to the size expression, not the type.
    fn parse_base_type(&mut self) -> Result<Type, SyntaxError> {
        let span = self.current_span();
        match self.current_kind().clone() {
            TokenKind::Int => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::Char => {
                self.advance();
                Ok(Type::Char)
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Type::Bool)
            }
            TokenKind::List => {
                self.advance();
                self.expect(&TokenKind::LBracket, "'[' opening a list element type")?;
                let inner = self.parse_type()?;
                self.expect(&TokenKind::RBracket, "']' closing a list element type")?;
                Ok(Type::list_of(inner))
            }
            other => Err(SyntaxError::unexpected(&other, "a type", span)),
        }
    }

    fn parse_local_defs(&mut self) -> Result<Vec<Def>, SyntaxError> {
        let mut defs = Vec::new();
        loop {
            if self.starts_type() {
                defs.push(Def::Var(self.parse_vardef()?));
            } else if self.check(&TokenKind::Decl) {
                defs.push(Def::Decl(self.parse_funcdecl()?));
            } else if self.check(&TokenKind::Def) {
                defs.push(Def::Func(self.parse_funcdef()?));
            } else {
                break;
            }
        }
        Ok(defs)
    }

    fn parse_vardef(&mut self) -> Result<VarDef, SyntaxError> {
        let start = self.current_span();
        let ty = self.parse_type()?;
        let (first, mut last_span) = self.expect_identifier()?;
        let mut names = vec![first];
        while self.check(&TokenKind::Comma) {
            self.advance();
            let (name, span) = self.expect_identifier()?;
            last_span = span;
            names.push(name);
        }
        Ok(VarDef {
            names,
            ty,
            span: start.to(last_span),
        })
    }

    fn parse_funcdecl(&mut self) -> Result<FuncDecl, SyntaxError> {
        self.expect(&TokenKind::Decl, "'decl'")?;
        let header = self.parse_header()?;
        Ok(FuncDecl { header })
    }

    // ---- statements ----------------------------------------------------

    /// Whether the current token can begin an expression — used to decide
    /// whether a bare `return` carries a value without attempting (and
    /// failing) to parse the next statement as one.
    fn starts_expr(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::IntLiteral(_)
                | TokenKind::CharLiteral(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
                | TokenKind::LParen
                | TokenKind::New
                | TokenKind::Head
                | TokenKind::Tail
                | TokenKind::NilQuestion
                | TokenKind::Identifier(_)
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Not
        )
    }

    fn stmt_list_follows(&self) -> bool {
        !matches!(
            self.current_kind(),
            TokenKind::End | TokenKind::Else | TokenKind::Elsif | TokenKind::Eof
        )
    }

    fn parse_stmt_list(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut stmts = Vec::new();
        while self.stmt_list_follows() {
            stmts.push(self.parse_stmt()?);
        }
        if stmts.is_empty() {
            return Err(SyntaxError::new(
                "a block must contain at least one statement",
                self.current_span(),
            ));
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        match self.current_kind().clone() {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let value = if self.starts_expr() {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Ok(Stmt::new(StmtKind::Return(value), start))
            }
            TokenKind::Exit => {
                self.advance();
                Ok(Stmt::new(StmtKind::Exit, start))
            }
            _ => {
                let simple = self.parse_simple()?;
                let span = start.to(self.previous_span());
                let kind = match simple {
                    SimpleStmt::Skip => StmtKind::Skip,
                    SimpleStmt::Assign { target, value } => StmtKind::Assign { target, value },
                    SimpleStmt::Call(e) => StmtKind::Call(e),
                };
                Ok(Stmt::new(kind, span))
            }
        }
    }

    fn previous_span(&self) -> Span {
        let idx = self.pos.saturating_sub(1);
        self.tokens[idx].span
    }

    /// A `simple`: `skip`, an assignment, or a bare call — the only shapes
    /// allowed inside a `for` loop's init/step lists, and reused for plain
    /// statements of the same shapes.
    fn parse_simple(&mut self) -> Result<SimpleStmt, SyntaxError> {
        if self.check(&TokenKind::Skip) {
            self.advance();
            return Ok(SimpleStmt::Skip);
        }
        let expr = self.parse_expr()?;
        if self.check(&TokenKind::Assign) {
            if !expr.is_lvalue() {
                return Err(SyntaxError::new(
                    "left-hand side of ':=' must be a variable or array element",
                    expr.span,
                ));
            }
            self.advance();
            let value = self.parse_expr()?;
            Ok(SimpleStmt::Assign { target: expr, value })
        } else {
            Ok(SimpleStmt::Call(expr))
        }
    }

    fn parse_simple_list(&mut self) -> Result<Vec<SimpleStmt>, SyntaxError> {
        let mut items = vec![self.parse_simple()?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            items.push(self.parse_simple()?);
        }
        Ok(items)
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.expect(&TokenKind::If, "'if'")?;
        let mut arms = vec![self.parse_if_arm()?];
        while self.check(&TokenKind::Elsif) {
            self.advance();
            arms.push(self.parse_if_arm()?);
        }
        let else_body = if self.check(&TokenKind::Else) {
            self.advance();
            self.expect(&TokenKind::Colon, "':'")?;
            Some(self.parse_stmt_list()?)
        } else {
            None
        };
        let end_span = self.expect(&TokenKind::End, "'end'")?.span;
        Ok(Stmt::new(StmtKind::If { arms, else_body }, start.to(end_span)))
    }

    fn parse_if_arm(&mut self) -> Result<IfArm, SyntaxError> {
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_stmt_list()?;
        Ok(IfArm { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.current_span();
        self.expect(&TokenKind::For, "'for'")?;
        let init = self.parse_simple_list()?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon, "';'")?;
        let step = self.parse_simple_list()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let body = self.parse_stmt_list()?;
        let end_span = self.expect(&TokenKind::End, "'end'")?.span;
        Ok(Stmt::new(
            StmtKind::For {
                init,
                condition,
                step,
                body,
            },
            start.to(end_span),
        ))
    }
}

// Expression parsing lives in `expr.rs`, appended to this `Parser` impl.
mod expr;
