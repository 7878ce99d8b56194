//! Expression parsing: one function per precedence level, from loosest to
//! tightest binding, matching the table in play for this language:
//!
//! ```text
//! or  <  and  <  not (prefix)  <  = <> < > <= >= (nonassoc)  <
//! # (right-assoc)  <  + - (left)  <  * / mod (left)  <  unary + - (right-assoc)
//! ```

use super::{Parser, SyntaxError};
use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::token::TokenKind;

impl Parser {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not_level()?;
        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_not_level()?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_not_level(&mut self) -> Result<Expr, SyntaxError> {
        if self.check(&TokenKind::Not) {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_not_level()?;
            let span = start.to(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_cmp()
    }

    /// Comparisons are non-associative: `a = b = c` is rejected rather than
    /// silently left- or right-grouped.
    fn parse_cmp(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_hash()?;
        let op = match self.current_kind() {
            TokenKind::Equal => BinaryOp::Eq,
            TokenKind::NotEqual => BinaryOp::NotEq,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::LessEqual => BinaryOp::LessEq,
            TokenKind::GreaterEqual => BinaryOp::GreaterEq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_hash()?;
        let span = left.span.to(right.span);
        Ok(Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        ))
    }

    /// `#` (list cons) is right-associative: `a # b # c` parses as
    /// `a # (b # c)`.
    fn parse_hash(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_additive()?;
        if self.check(&TokenKind::Hash) {
            self.advance();
            let right = self.parse_hash()?;
            let span = left.span.to(right.span);
            return Ok(Expr::new(
                ExprKind::Binary {
                    op: BinaryOp::Cons,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            ));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_mult()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mult()?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_mult(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Mod => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.to(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    /// Unary `+`/`-` bind tighter than `*`/`/`/`mod` and are right-associative
    /// (`--x` is `-(-x)`), the highest-precedence level in the table.
    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.current_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.current_span();
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.to(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    /// Parses an atom, then any trailing `[index]` chains.
    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_atom()?;
        while self.check(&TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expr()?;
            let end_span = self.expect(&TokenKind::RBracket, "']' closing an index")?.span;
            let span = expr.span.to(end_span);
            expr = Expr::new(
                ExprKind::Index {
                    array: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.current_span();
        match self.current_kind().clone() {
            TokenKind::IntLiteral(v) => {
                self.advance();
                Ok(Expr::new(ExprKind::IntLiteral(v), start))
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                Ok(Expr::new(ExprKind::CharLiteral(c), start))
            }
            TokenKind::StringLiteral(bytes) => {
                self.advance();
                Ok(Expr::new(ExprKind::StringLiteral(bytes), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLiteral(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::new(ExprKind::BoolLiteral(false), start))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::new(ExprKind::NilLiteral, start))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), start.to(end_span)))
            }
            TokenKind::New => {
                self.advance();
                let elem_ty = self.parse_base_type()?;
                self.expect(&TokenKind::LBracket, "'[' opening the array size")?;
                let size = self.parse_expr()?;
                let end_span = self.expect(&TokenKind::RBracket, "']' closing the array size")?.span;
                Ok(Expr::new(
                    ExprKind::New {
                        elem_ty,
                        size: Box::new(size),
                    },
                    start.to(end_span),
                ))
            }
            TokenKind::Head => {
                self.advance();
                self.expect(&TokenKind::LParen, "'(' after 'head'")?;
                let inner = self.parse_expr()?;
                let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
                Ok(Expr::new(ExprKind::Head(Box::new(inner)), start.to(end_span)))
            }
            TokenKind::Tail => {
                self.advance();
                self.expect(&TokenKind::LParen, "'(' after 'tail'")?;
                let inner = self.parse_expr()?;
                let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
                Ok(Expr::new(ExprKind::Tail(Box::new(inner)), start.to(end_span)))
            }
            TokenKind::NilQuestion => {
                self.advance();
                self.expect(&TokenKind::LParen, "'(' after 'nil?'")?;
                let inner = self.parse_expr()?;
                let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
                Ok(Expr::new(ExprKind::IsNil(Box::new(inner)), start.to(end_span)))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_call_args()?;
                    let end_span = self.expect(&TokenKind::RParen, "')'")?.span;
                    Ok(Expr::new(
                        ExprKind::Call { callee: name, args },
                        start.to(end_span),
                    ))
                } else {
                    Ok(Expr::new(ExprKind::Identifier(name), start))
                }
            }
            other => Err(SyntaxError::unexpected(&other, "an expression", start)),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        args.push(self.parse_expr()?);
        while self.check(&TokenKind::Comma) {
            self.advance();
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }
}
