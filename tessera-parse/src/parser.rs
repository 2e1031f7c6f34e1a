#![forbid(unsafe_code)]

use std::mem;

use tessera_ast::{
    Block, ConditionalBlock, Expr, ExprKind, Ident, InfixOp, Position, PrefixOp, Program, Stmt,
    StmtKind,
};
use tessera_lex::{Lexer, Token, TokenKind};

use crate::error::ParseError;
use crate::Error;

/// Binding strengths of the expression grammar, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,
    And,
    Equality,
    Relational,
    Additive,
    Multiplicative,
    Prefix,
    Field,
}

fn precedence_of(kind: TokenKind) -> Option<Precedence> {
    Some(match kind {
        TokenKind::Or => Precedence::Or,
        TokenKind::And => Precedence::And,
        TokenKind::Equal | TokenKind::NotEqual => Precedence::Equality,
        TokenKind::LessThan
        | TokenKind::LessOrEqual
        | TokenKind::GreaterThan
        | TokenKind::GreaterOrEqual => Precedence::Relational,
        TokenKind::Plus | TokenKind::Minus => Precedence::Additive,
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Precedence::Multiplicative,
        TokenKind::LeftParen | TokenKind::Dot | TokenKind::LeftBracket => Precedence::Field,
        _ => return None,
    })
}

fn infix_op_of(kind: TokenKind) -> Option<InfixOp> {
    Some(match kind {
        TokenKind::Equal => InfixOp::Eq,
        TokenKind::NotEqual => InfixOp::NotEq,
        TokenKind::LessThan => InfixOp::Lt,
        TokenKind::LessOrEqual => InfixOp::Le,
        TokenKind::GreaterThan => InfixOp::Gt,
        TokenKind::GreaterOrEqual => InfixOp::Ge,
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Asterisk => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::Percent => InfixOp::Rem,
        TokenKind::And => InfixOp::And,
        TokenKind::Or => InfixOp::Or,
        _ => return None,
    })
}

/// Parser consumes the token stream of a [`Lexer`] and produces an abstract
/// syntax tree. It keeps a two-token window (current + peek) and dispatches
/// expressions Pratt-style over [`Precedence`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    curr: Token,
    next: Token,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Result<Self, Error> {
        let mut p = Self {
            lexer,
            curr: placeholder(),
            next: placeholder(),
        };
        p.read_next()?;
        p.read_next()?;
        Ok(p)
    }

    pub fn parse_program(&mut self) -> Result<Program, Error> {
        let pos = self.curr.pos;

        let mut stmts = Vec::new();
        while !self.at(TokenKind::Eof) {
            stmts.push(self.parse_statement()?);
        }

        Ok(Program { pos, stmts })
    }

    fn parse_statement(&mut self) -> Result<Stmt, Error> {
        match self.curr.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Break => self.parse_loop_control(StmtKind::Break),
            TokenKind::Continue => self.parse_loop_control(StmtKind::Continue),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, Error> {
        let pos = self.curr.pos;

        self.expect_next(TokenKind::Ident)?;
        let ident = Ident {
            pos: self.curr.pos,
            name: self.curr.literal.clone(),
        };

        self.expect_next(TokenKind::Assign)?;
        self.read_next()?;

        let value = self.parse_expression(Precedence::Lowest)?;

        Ok(Stmt {
            pos,
            kind: StmtKind::Let { ident, value },
        })
    }

    fn parse_loop_control(&mut self, kind: StmtKind) -> Result<Stmt, Error> {
        let pos = self.curr.pos;
        self.read_next()?;
        Ok(Stmt { pos, kind })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, Error> {
        let pos = self.curr.pos;
        let expr = self.parse_expression(Precedence::Lowest)?;
        Ok(Stmt {
            pos,
            kind: StmtKind::Expr(expr),
        })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, Error> {
        if self.at(TokenKind::Eof) {
            return Err(self.error_at_curr("expression expected"));
        }

        let mut left = self.parse_prefix()?;

        while !self.at(TokenKind::Eof) {
            let Some(curr_precedence) = precedence_of(self.curr.kind) else {
                // current token is not an operator, stop here
                break;
            };

            if precedence >= curr_precedence {
                break;
            }

            left = match self.curr.kind {
                TokenKind::LeftParen => self.parse_call_expression(left)?,
                TokenKind::Dot | TokenKind::LeftBracket => self.parse_field_expression(left)?,
                _ => self.parse_infix_expression(left, curr_precedence)?,
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, Error> {
        match self.curr.kind {
            TokenKind::Ident => {
                let ident = self.parse_ident()?;
                Ok(Expr {
                    pos: ident.pos,
                    kind: ExprKind::Ident(ident.name),
                })
            }
            TokenKind::Int => self.parse_int_literal(),
            TokenKind::Str => {
                let e = Expr {
                    pos: self.curr.pos,
                    kind: ExprKind::Str(self.curr.literal.clone()),
                };
                self.read_next()?;
                Ok(e)
            }
            TokenKind::True | TokenKind::False => {
                let e = Expr {
                    pos: self.curr.pos,
                    kind: ExprKind::Bool(self.at(TokenKind::True)),
                };
                self.read_next()?;
                Ok(e)
            }
            TokenKind::Nil => {
                // the node records the nil token's own position
                let pos = self.curr.pos;
                self.read_next()?;
                Ok(Expr {
                    pos,
                    kind: ExprKind::Nil,
                })
            }
            TokenKind::Literal => {
                let e = Expr {
                    pos: self.curr.pos,
                    kind: ExprKind::LiteralText(self.curr.literal.clone()),
                };
                self.read_next()?;
                Ok(e)
            }
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LeftParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Capture => self.parse_capture_expression(),
            TokenKind::For => self.parse_for_expression(),
            TokenKind::LeftBrace => self.parse_hash_expression(),
            _ => Err(self.error_at_curr(format!("expected an expression, got {}", self.curr))),
        }
    }

    fn parse_prefix_expression(&mut self) -> Result<Expr, Error> {
        let pos = self.curr.pos;
        let op = match self.curr.kind {
            TokenKind::Bang => PrefixOp::Not,
            _ => PrefixOp::Neg,
        };

        self.read_next()?;
        let expr = self.parse_expression(Precedence::Prefix)?;

        Ok(Expr {
            pos,
            kind: ExprKind::Prefix {
                op,
                expr: Box::new(expr),
            },
        })
    }

    fn parse_infix_expression(
        &mut self,
        left: Expr,
        curr_precedence: Precedence,
    ) -> Result<Expr, Error> {
        let op = match infix_op_of(self.curr.kind) {
            Some(op) => op,
            None => return Err(self.error_at_curr(format!("unexpected operator {}", self.curr))),
        };

        self.read_next()?;
        let right = self.parse_expression(curr_precedence)?;

        Ok(Expr {
            pos: left.pos,
            kind: ExprKind::Infix {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        })
    }

    fn parse_grouped_expression(&mut self) -> Result<Expr, Error> {
        self.read_next()?;

        let e = self.parse_expression(Precedence::Lowest)?;

        if !self.at(TokenKind::RightParen) {
            return Err(self.error_at_curr("right paren expected"));
        }
        self.read_next()?;

        Ok(e)
    }

    fn parse_int_literal(&mut self) -> Result<Expr, Error> {
        let value: i64 = self.curr.literal.parse().map_err(|e| {
            self.error_at_curr(format!("error parsing int literal: {e}"))
        })?;

        let e = Expr {
            pos: self.curr.pos,
            kind: ExprKind::Int(value),
        };
        self.read_next()?;
        Ok(e)
    }

    fn parse_ident(&mut self) -> Result<Ident, Error> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error_at_curr(format!(
                "expected token {}, got {} instead",
                TokenKind::Ident,
                self.curr
            )));
        }

        let ident = Ident {
            pos: self.curr.pos,
            name: self.curr.literal.clone(),
        };
        self.read_next()?;
        Ok(ident)
    }

    fn parse_if_expression(&mut self) -> Result<Expr, Error> {
        let if_pos = self.curr.pos;

        let mut block_start = self.curr.clone();
        self.read_next()?;

        let mut conditionals = Vec::new();
        let mut have_else = false;

        while !self.at(TokenKind::Eof) {
            match block_start.kind {
                TokenKind::Else if !have_else => have_else = true,
                TokenKind::Else => {
                    return Err(self.error_at(
                        &block_start,
                        "if expression can only have a single else block",
                    ));
                }
                TokenKind::ElseIf if have_else => {
                    return Err(
                        self.error_at(&block_start, "else block must be last in if expression")
                    );
                }
                _ => {}
            }

            let condition = match block_start.kind {
                TokenKind::If | TokenKind::ElseIf => {
                    Some(self.parse_expression(Precedence::Lowest)?)
                }
                _ => None,
            };

            let (block, end_token) = self.parse_block(&[
                TokenKind::ElseIf,
                TokenKind::Else,
                TokenKind::End,
            ])?;

            conditionals.push(ConditionalBlock {
                pos: block_start.pos,
                condition,
                block,
            });

            if end_token.kind == TokenKind::End {
                return Ok(Expr {
                    pos: if_pos,
                    kind: ExprKind::If { conditionals },
                });
            }

            block_start = end_token;
        }

        Err(self.error_at_curr("premature end of file"))
    }

    fn parse_for_expression(&mut self) -> Result<Expr, Error> {
        let pos = self.curr.pos;
        self.read_next()?;

        let ident = self.parse_ident()?;

        let status_ident = if self.at(TokenKind::Comma) {
            self.read_next()?;
            Some(self.parse_ident()?)
        } else {
            None
        };

        if !self.at(TokenKind::In) {
            return Err(self.error_at_curr("in keyword expected"));
        }
        self.read_next()?;

        let range = self.parse_expression(Precedence::Lowest)?;

        let (block, _) = self.parse_block(&[TokenKind::End])?;

        Ok(Expr {
            pos,
            kind: ExprKind::For {
                ident,
                status_ident,
                range: Box::new(range),
                block,
            },
        })
    }

    fn parse_capture_expression(&mut self) -> Result<Expr, Error> {
        let pos = self.curr.pos;
        self.read_next()?;

        let (block, _) = self.parse_block(&[TokenKind::End])?;

        Ok(Expr {
            pos,
            kind: ExprKind::Capture { block },
        })
    }

    /// Parses statements until one of `end_kinds` is the current token,
    /// consumes it, and returns it alongside the block.
    fn parse_block(&mut self, end_kinds: &[TokenKind]) -> Result<(Block, Token), Error> {
        let pos = self.curr.pos;

        let mut stmts = Vec::new();
        while !self.at(TokenKind::Eof) && !end_kinds.contains(&self.curr.kind) {
            stmts.push(self.parse_statement()?);
        }

        if self.at(TokenKind::Eof) {
            return Err(self.error_at_curr("end of block not found"));
        }

        let end_token = self.curr.clone();
        self.read_next()?;

        Ok((Block { pos, stmts }, end_token))
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Result<Expr, Error> {
        self.read_next()?;

        let mut args = Vec::new();
        if !self.at(TokenKind::RightParen) {
            loop {
                args.push(self.parse_expression(Precedence::Lowest)?);

                // a comma must introduce another argument
                if self.at(TokenKind::Comma) {
                    self.read_next()?;
                    continue;
                }
                break;
            }
        }

        if !self.at(TokenKind::RightParen) {
            return Err(self.error_at_curr("right paren expected"));
        }
        self.read_next()?;

        Ok(Expr {
            pos: callee.pos,
            kind: ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
        })
    }

    fn parse_field_expression(&mut self, callee: Expr) -> Result<Expr, Error> {
        let dot = self.at(TokenKind::Dot);
        self.read_next()?;

        // x.y is syntactic sugar for x["y"]
        if dot {
            if !self.at(TokenKind::Ident) {
                return Err(self.error_at_curr("expected identifier as field index"));
            }

            let index = Expr {
                pos: self.curr.pos,
                kind: ExprKind::Str(self.curr.literal.clone()),
            };
            self.read_next()?;

            return Ok(Expr {
                pos: callee.pos,
                kind: ExprKind::Field {
                    callee: Box::new(callee),
                    index: Box::new(index),
                },
            });
        }

        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.at(TokenKind::RightBracket) {
            return Err(self.error_at_curr("expected right bracket"));
        }
        self.read_next()?;

        Ok(Expr {
            pos: callee.pos,
            kind: ExprKind::Field {
                callee: Box::new(callee),
                index: Box::new(index),
            },
        })
    }

    fn parse_hash_expression(&mut self) -> Result<Expr, Error> {
        let pos = self.curr.pos;
        self.read_next()?;

        let mut entries: Vec<(String, Expr)> = Vec::new();

        if !self.at(TokenKind::RightBrace) {
            loop {
                let key_token = self.curr.clone();
                let key_expr = self.parse_expression(Precedence::Lowest)?;

                let ExprKind::Str(key) = key_expr.kind else {
                    return Err(
                        self.error_at(&key_token, "key in hash expression is not a string")
                    );
                };

                if key.is_empty() {
                    return Err(self.error_at(&key_token, "empty key in hash expression"));
                }

                if entries.iter().any(|(k, _)| *k == key) {
                    return Err(self.error_at(
                        &key_token,
                        format!("duplicate key in hash expression: {key}"),
                    ));
                }

                if !self.at(TokenKind::Colon) {
                    return Err(self.error_at_curr("expected colon after key in hash expression"));
                }
                self.read_next()?;

                let value = self.parse_expression(Precedence::Lowest)?;
                entries.push((key, value));

                // a comma must introduce another entry
                if self.at(TokenKind::Comma) {
                    self.read_next()?;
                    continue;
                }
                break;
            }
        }

        if !self.at(TokenKind::RightBrace) {
            return Err(self.error_at_curr("expected right brace to end hash expression"));
        }
        self.read_next()?;

        Ok(Expr {
            pos,
            kind: ExprKind::Hash { entries },
        })
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.curr.kind == kind
    }

    fn expect_next(&mut self, kind: TokenKind) -> Result<(), Error> {
        if self.next.kind != kind {
            let message = format!("expected token {}, got {} instead", kind, self.next);
            return Err(self.error_at(&self.next, message));
        }
        self.read_next()
    }

    fn read_next(&mut self) -> Result<(), Error> {
        let t = self.lexer.next_token()?;
        self.curr = mem::replace(&mut self.next, t);
        Ok(())
    }

    fn error_at_curr(&self, message: impl Into<String>) -> Error {
        self.error_at(&self.curr, message)
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::Parse(ParseError {
            message: message.into(),
            pos: token.pos,
            span: token.span,
        })
    }
}

fn placeholder() -> Token {
    Token {
        kind: TokenKind::Eof,
        literal: String::new(),
        pos: Position::default(),
        span: tessera_ast::span_between(0, 0),
    }
}
