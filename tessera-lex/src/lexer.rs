#![forbid(unsafe_code)]

use logos::{FilterResult, Logos};
use miette::Diagnostic;
use thiserror::Error;

use tessera_ast::{span_between, Position, Span};

use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Diagnostic)]
#[error("lex error at {pos}: {message}")]
#[diagnostic(code(tessera::lex))]
pub struct LexError {
    pub message: String,
    pub pos: Position,
    #[label]
    pub span: Span,
}

impl LexError {
    pub fn line(&self) -> u32 {
        self.pos.line
    }

    pub fn column(&self) -> u32 {
        self.pos.column
    }
}

#[derive(Clone, Debug, Default)]
struct Extras {
    /// Line comments are additionally terminated by `%>` when the lexer
    /// started out in literal mode.
    started_in_literal: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum RawError {
    #[default]
    Illegal,
    UnterminatedString,
    UnterminatedBlockComment,
}

/// Raw code-mode tokens. Mode switching and literal text live in [`Lexer`];
/// this layer only sees the inside of code regions.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(extras = Extras)]
#[logos(error = RawError)]
enum RawToken {
    #[token("let")]
    KwLet,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("elseif")]
    KwElseIf,
    #[token("end")]
    KwEnd,
    #[token("for")]
    KwFor,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("in")]
    KwIn,
    #[token("capture")]
    KwCapture,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("nil")]
    KwNil,

    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("||")]
    Or,
    #[token("&&")]
    And,

    #[token("=")]
    Assign,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,

    #[token("%>")]
    CodeEnd,
    #[token("<%")]
    CodeStart,

    #[regex("[0-9]+")]
    Int,
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[token("\"", lex_string)]
    #[token("'", lex_string)]
    Str(String),

    #[token("//", lex_line_comment)]
    #[token("/*", lex_block_comment)]
    Comment,
}

fn lex_string(lex: &mut logos::Lexer<RawToken>) -> Result<String, RawError> {
    let quote = lex.slice().chars().next().unwrap_or('"');

    let mut out = String::new();
    let mut chars = lex.remainder().char_indices();

    loop {
        let Some((i, c)) = chars.next() else {
            return Err(RawError::UnterminatedString);
        };

        if c == quote {
            lex.bump(i + c.len_utf8());
            return Ok(out);
        }

        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some((_, esc)) = chars.next() else {
            return Err(RawError::UnterminatedString);
        };

        match esc {
            'r' => out.push('\r'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            // Unknown escapes are kept verbatim.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
}

fn lex_line_comment(lex: &mut logos::Lexer<RawToken>) -> FilterResult<(), RawError> {
    let rem = lex.remainder();

    let mut end = rem.find('\n').unwrap_or(rem.len());
    if lex.extras.started_in_literal {
        if let Some(i) = rem.find("%>") {
            end = end.min(i);
        }
    }

    lex.bump(end);
    FilterResult::Skip
}

fn lex_block_comment(lex: &mut logos::Lexer<RawToken>) -> FilterResult<(), RawError> {
    match lex.remainder().find("*/") {
        Some(i) => {
            lex.bump(i + 2);
            FilterResult::Skip
        }
        None => FilterResult::Error(RawError::UnterminatedBlockComment),
    }
}

/// Lexer reads a template source and produces a sequence of tokens, pulled
/// one at a time via [`Lexer::next_token`]. The sequence ends with an `EOF`
/// token; an error terminates it early.
///
/// The lexer starts in literal mode, accumulating raw text until `<%`
/// switches it into code mode; `%>` switches back. A lexer created with
/// [`Lexer::new_in_code_mode`] starts (and stays) in code mode, and rejects
/// both delimiters.
pub struct Lexer<'a> {
    src: &'a str,
    line_starts: Vec<usize>,
    offset: usize,
    in_code: bool,
    started_in_code: bool,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self::with_mode(src, false)
    }

    pub fn new_in_code_mode(src: &'a str) -> Self {
        Self::with_mode(src, true)
    }

    fn with_mode(src: &'a str, start_in_code: bool) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            src,
            line_starts,
            offset: 0,
            in_code: start_in_code,
            started_in_code: start_in_code,
            done: false,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            if self.done {
                return Ok(self.eof());
            }

            if self.in_code {
                if let Some(t) = self.next_code_token()? {
                    return Ok(t);
                }
                // fell back to literal mode
                continue;
            }

            let rest = &self.src[self.offset..];
            if rest.is_empty() {
                self.done = true;
                return Ok(self.eof());
            }

            match rest.find("<%") {
                Some(0) => {
                    self.offset += 2;
                    self.in_code = true;
                }
                Some(k) => {
                    let t = self.token(TokenKind::Literal, &rest[..k], self.offset, self.offset + k);
                    self.offset += k;
                    return Ok(t);
                }
                None => {
                    let t = self.token(TokenKind::Literal, rest, self.offset, self.src.len());
                    self.offset = self.src.len();
                    return Ok(t);
                }
            }
        }
    }

    /// Lexes one raw token in code mode. Returns `None` after a `%>`
    /// switched the lexer back to literal mode.
    fn next_code_token(&mut self) -> Result<Option<Token>, LexError> {
        let extras = Extras {
            started_in_literal: !self.started_in_code,
        };
        let mut raw = RawToken::lexer_with_extras(&self.src[self.offset..], extras);

        let Some(result) = raw.next() else {
            self.done = true;
            if !self.started_in_code {
                let end = self.src.len();
                return Err(self.error(end, end, "end of code mode block expected"));
            }
            return Ok(Some(self.eof()));
        };

        let start = self.offset + raw.span().start;
        let end = self.offset + raw.span().end;
        let slice = raw.slice();

        let result = match result {
            Err(e) => {
                self.done = true;
                return Err(match e {
                    RawError::Illegal => self.illegal(start, end, slice),
                    RawError::UnterminatedString => self.error(start, end, "end of string not found"),
                    RawError::UnterminatedBlockComment => {
                        self.error(start, end, "end of block comment not found")
                    }
                });
            }
            Ok(t) => t,
        };

        self.offset = end;

        let kind = match result {
            RawToken::CodeEnd => {
                if self.started_in_code {
                    self.done = true;
                    return Err(self.illegal(start, end, slice));
                }
                self.in_code = false;
                return Ok(None);
            }
            // `<%` never opens a nested code region.
            RawToken::CodeStart => {
                self.done = true;
                return Err(self.illegal(start, end, slice));
            }
            // comments are skipped inside the raw layer
            RawToken::Comment => return Ok(None),

            RawToken::KwLet => TokenKind::Let,
            RawToken::KwIf => TokenKind::If,
            RawToken::KwElse => TokenKind::Else,
            RawToken::KwElseIf => TokenKind::ElseIf,
            RawToken::KwEnd => TokenKind::End,
            RawToken::KwFor => TokenKind::For,
            RawToken::KwBreak => TokenKind::Break,
            RawToken::KwContinue => TokenKind::Continue,
            RawToken::KwIn => TokenKind::In,
            RawToken::KwCapture => TokenKind::Capture,
            RawToken::KwTrue => TokenKind::True,
            RawToken::KwFalse => TokenKind::False,
            RawToken::KwNil => TokenKind::Nil,

            RawToken::Equal => TokenKind::Equal,
            RawToken::NotEqual => TokenKind::NotEqual,
            RawToken::LessOrEqual => TokenKind::LessOrEqual,
            RawToken::GreaterOrEqual => TokenKind::GreaterOrEqual,
            RawToken::Or => TokenKind::Or,
            RawToken::And => TokenKind::And,
            RawToken::Assign => TokenKind::Assign,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Asterisk => TokenKind::Asterisk,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::LessThan => TokenKind::LessThan,
            RawToken::GreaterThan => TokenKind::GreaterThan,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::LeftBracket => TokenKind::LeftBracket,
            RawToken::RightBracket => TokenKind::RightBracket,
            RawToken::LeftBrace => TokenKind::LeftBrace,
            RawToken::RightBrace => TokenKind::RightBrace,

            RawToken::Int => TokenKind::Int,
            RawToken::Ident => TokenKind::Ident,

            RawToken::Str(s) => {
                return Ok(Some(Token {
                    kind: TokenKind::Str,
                    literal: s,
                    pos: self.position_at(start),
                    span: span_between(start, end),
                }))
            }
        };

        Ok(Some(self.token(kind, slice, start, end)))
    }

    fn token(&self, kind: TokenKind, literal: &str, start: usize, end: usize) -> Token {
        Token {
            kind,
            literal: literal.to_string(),
            pos: self.position_at(start),
            span: span_between(start, end),
        }
    }

    fn eof(&mut self) -> Token {
        self.done = true;
        self.token(TokenKind::Eof, "", self.src.len(), self.src.len())
    }

    fn error(&self, start: usize, end: usize, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            pos: self.position_at(start),
            span: span_between(start, end),
        }
    }

    fn illegal(&self, start: usize, end: usize, literal: &str) -> LexError {
        let t = self.token(TokenKind::Illegal, literal, start, end);
        self.error(start, end, format!("illegal token found: {t}"))
    }

    fn position_at(&self, offset: usize) -> Position {
        let line_idx = self.line_starts.partition_point(|&s| s <= offset) - 1;
        let line_start = self.line_starts[line_idx];
        let column = self.src[line_start..offset].chars().count() as u32 + 1;
        Position::new(line_idx as u32 + 1, column, offset)
    }
}
