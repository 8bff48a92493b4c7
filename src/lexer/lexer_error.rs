use thiserror::Error;

use crate::diagnostics::Span;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("expected number literal")]
    ExpectedNumber,
    #[error("unary + is not supported")]
    UnaryPlus,
    #[error("decimal number literal cannot have an exponent")]
    NumberExponent,
}

/// A lex error with the span it was detected at.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexErrorKind {
    pub(super) fn at(self, span: Span) -> LexError {
        LexError { kind: self, span }
    }
}
