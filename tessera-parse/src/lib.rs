#![forbid(unsafe_code)]

mod error;
mod parser;

use miette::Diagnostic;
use thiserror::Error as ThisError;

use tessera_lex::{LexError, Lexer};

pub use error::ParseError;
pub use parser::Parser;

/// Failure of the lex/parse front half of the pipeline.
#[derive(Debug, ThisError, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn line(&self) -> u32 {
        match self {
            Error::Lex(e) => e.line(),
            Error::Parse(e) => e.line(),
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            Error::Lex(e) => e.column(),
            Error::Parse(e) => e.column(),
        }
    }
}

/// Parses a template source that starts in literal mode.
pub fn parse_source(src: &str) -> Result<tessera_ast::Program, Error> {
    Parser::new(Lexer::new(src))?.parse_program()
}

/// Parses a source that consists of template code only, with no `<% %>`
/// delimiters.
pub fn parse_source_in_code_mode(src: &str) -> Result<tessera_ast::Program, Error> {
    Parser::new(Lexer::new_in_code_mode(src))?.parse_program()
}
