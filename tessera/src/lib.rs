#![forbid(unsafe_code)]

//! tessera is a text template engine. Templates are byte streams in which
//! literal text alternates with code regions delimited by `<%` and `%>`;
//! the code regions use a small expression/statement language with
//! variables, arithmetic, conditionals, loops over rangers, and calls into
//! host-provided values.
//!
//! Output is never auto-escaped: literal template text and strings wrapped
//! in [`SafeString`] are written verbatim, while any other non-empty bare
//! string renders as `!UNSAFE!`. Hosts provide escaping helpers (see
//! [`helpers`]) that return safe strings.

pub mod helpers;
mod render;

use miette::Diagnostic;
use thiserror::Error as ThisError;

pub use render::{
    render, LoadFn, RenderOptions, Renderer, RendererBuilder, DEFAULT_TEMPLATE_FUNC_NAME,
};
pub use tessera_interpret::{
    Arg, ArgumentResolver, Context, EvalError, Evaluator, Func, IntRanger, LiteralStringer,
    MapRanger, Object, ParamKind, Ranger, SafeString, Scope, SeqRanger, Status, Value,
};
pub use tessera_lex::{LexError, Lexer, Token, TokenKind};
pub use tessera_parse::{parse_source, parse_source_in_code_mode, ParseError, Parser};

/// Any failure of the render pipeline. The lex/parse/eval/host kinds carry
/// the template source position they occurred at.
#[derive(Debug, ThisError, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cannot use template function name, identifier already in use: {0}")]
    ReservedName(String),
}

impl Error {
    pub fn is_lex_error(&self) -> bool {
        matches!(self, Error::Lex(_))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse(_))
    }

    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, Error::Eval(e) if !e.is_host())
    }

    pub fn is_host_error(&self) -> bool {
        matches!(self, Error::Eval(e) if e.is_host())
    }

    /// The 1-based template source location of lex, parse, eval, and host
    /// errors.
    pub fn location(&self) -> Option<(u32, u32)> {
        match self {
            Error::Lex(e) => Some((e.line(), e.column())),
            Error::Parse(e) => Some((e.line(), e.column())),
            Error::Eval(e) => Some((e.line(), e.column())),
            Error::Io(_) | Error::ReservedName(_) => None,
        }
    }
}

impl From<tessera_parse::Error> for Error {
    fn from(e: tessera_parse::Error) -> Self {
        match e {
            tessera_parse::Error::Lex(e) => Error::Lex(e),
            tessera_parse::Error::Parse(e) => Error::Parse(e),
        }
    }
}

/// A pipeline failure decorated with the name of the template being
/// rendered.
#[derive(Debug, ThisError, Diagnostic)]
#[error("error rendering template {name}: {source}")]
pub struct RenderError {
    name: String,
    #[source]
    #[diagnostic_source]
    source: Error,
}

impl RenderError {
    pub(crate) fn new(name: impl Into<String>, source: Error) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    pub fn template_name(&self) -> &str {
        &self.name
    }

    pub fn cause(&self) -> &Error {
        &self.source
    }

    pub fn is_lex_error(&self) -> bool {
        self.source.is_lex_error()
    }

    pub fn is_parse_error(&self) -> bool {
        self.source.is_parse_error()
    }

    pub fn is_evaluation_error(&self) -> bool {
        self.source.is_evaluation_error()
    }

    pub fn is_host_error(&self) -> bool {
        self.source.is_host_error()
    }

    pub fn location(&self) -> Option<(u32, u32)> {
        self.source.location()
    }
}
