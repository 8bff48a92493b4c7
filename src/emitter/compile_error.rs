use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::Span;
use crate::formats::FormatError;
use crate::literals::StringError;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileErrorKind {
    /// Failure writing the output stream.
    #[error(transparent)]
    Output(#[from] std::io::Error),
    /// Failure reading a referenced resource file.
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file not found: {filename}")]
    FileNotFound { filename: String },
    #[error("{source} ({path})")]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("file too large to embed: {path}")]
    FileTooLarge { path: PathBuf },
    #[error(transparent)]
    String(#[from] StringError),
    #[error("duplicate string id {id}")]
    DuplicateStringId { id: u16 },
    #[error("accelerator cannot be both VIRTKEY and ASCII")]
    AcceleratorTypeConflict,
    #[error("invalid control character in accelerator")]
    InvalidControlCharacter,
    #[error("accelerator key is empty")]
    EmptyAcceleratorKey,
    #[error("accelerator key is more than two characters long")]
    AcceleratorKeyTooLong,
}

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub span: Span,
}

impl CompileErrorKind {
    pub fn at(self, span: Span) -> CompileError {
        CompileError { kind: self, span }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(error: std::io::Error) -> Self {
        CompileErrorKind::Output(error).at(Span::default())
    }
}
