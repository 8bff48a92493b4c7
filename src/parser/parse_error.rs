use thiserror::Error;

use crate::diagnostics::Span;
use crate::lexer::LexError;
use crate::resources::TypeError;

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(#[from] crate::lexer::LexErrorKind),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("expected {expected}, but got '{found}'")]
    ExpectedButGot {
        expected: &'static str,
        found: String,
    },
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("reached unexpected end of file")]
    UnexpectedEof,
    #[error("unterminated raw data block")]
    UnterminatedBlock,
    #[error("id of a {type_name} resource must be an ordinal")]
    IdMustBeOrdinal { type_name: String },
    #[error("resource type '{type_name}' cannot use a raw data block")]
    RawDataNotAllowed { type_name: String },
    #[error("expected number expression, but got ')'; the reference compiler would skip the rest of the expression here")]
    StrayCloseParen,
    #[error("menu contains no items")]
    EmptyMenu,
    #[error("menus cannot be nested more than {0} levels deep")]
    MenuNestingTooDeep(u32),
    #[error("version info blocks cannot be nested more than {0} levels deep")]
    VersionNestingTooDeep(u32),
    #[error("expressions cannot be nested more than {0} levels deep")]
    ExpressionNestingTooDeep(u32),
    #[error("dialogs cannot have more than {0} controls")]
    TooManyDialogControls(u32),
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseErrorKind {
    pub fn at(self, span: Span) -> ParseError {
        ParseError { kind: self, span }
    }
}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError {
            kind: ParseErrorKind::Lex(error.kind),
            span: error.span,
        }
    }
}
