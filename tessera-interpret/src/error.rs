#![forbid(unsafe_code)]

use miette::Diagnostic;
use thiserror::Error;

use tessera_ast::{Position, Span};

/// Failure during evaluation: either the evaluator itself rejected
/// something (`Eval`), or a called host function returned an error
/// (`Host`, positioned at the call site).
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("evaluation error at {pos}: {message}")]
    #[diagnostic(code(tessera::eval))]
    Eval {
        pos: Position,
        message: String,
        #[label]
        span: Span,
    },

    #[error("host error at {pos}: {message}")]
    #[diagnostic(code(tessera::host))]
    Host {
        pos: Position,
        message: String,
        #[label]
        span: Span,
    },
}

impl EvalError {
    pub(crate) fn new(pos: Position, message: impl Into<String>) -> Self {
        EvalError::Eval {
            pos,
            message: message.into(),
            span: pos.span(),
        }
    }

    pub(crate) fn host(pos: Position, report: miette::Report) -> Self {
        EvalError::Host {
            pos,
            message: report.to_string(),
            span: pos.span(),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, EvalError::Host { .. })
    }

    pub fn line(&self) -> u32 {
        self.position().line
    }

    pub fn column(&self) -> u32 {
        self.position().column
    }

    pub fn message(&self) -> &str {
        match self {
            EvalError::Eval { message, .. } | EvalError::Host { message, .. } => message,
        }
    }

    fn position(&self) -> Position {
        match self {
            EvalError::Eval { pos, .. } | EvalError::Host { pos, .. } => *pos,
        }
    }
}
