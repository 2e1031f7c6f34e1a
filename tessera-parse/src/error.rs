#![forbid(unsafe_code)]

use miette::Diagnostic;
use thiserror::Error;

use tessera_ast::{Position, Span};

#[derive(Debug, Error, Diagnostic)]
#[error("parse error at {pos}: {message}")]
#[diagnostic(code(tessera::parse))]
pub struct ParseError {
    pub message: String,
    pub pos: Position,
    #[label]
    pub span: Span,
}

impl ParseError {
    pub fn line(&self) -> u32 {
        self.pos.line
    }

    pub fn column(&self) -> u32 {
        self.pos.column
    }
}
