//! Structured diagnostic records.
//!
//! Hard errors travel through each stage's `Result` type and abort the
//! current parse or emit. Everything that must *not* block compilation -
//! compatibility warnings and the notes that accompany them - accumulates
//! here in an append-only list. Rendering to a terminal is the caller's
//! concern; this module only defines the data model.

use thiserror::Error;

/// A byte range into the preprocessed source, with the 1-based line number
/// of its first byte.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32) -> Self {
        Self { start, end, line }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// The closed set of non-fatal diagnostic reasons.
///
/// Warnings flag either a construct the reference compiler would silently
/// miscompile, or a construct it treats differently than we do. Each
/// `Note*` variant accompanies the warning or error listed in its doc
/// comment and points the user toward the source-compatible spelling.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Reason {
    #[error("code page pragma in included file is ignored")]
    CodePagePragmaInIncludedFile,
    #[error("unknown code page {0}, the pragma is ignored")]
    UnknownCodePage(u32),
    #[error("the reference compiler would miscompile the params of this control because the style param is not followed by a comma")]
    ControlStyleParamsMiscompile,
    /// Accompanies [`Reason::ControlStyleParamsMiscompile`].
    #[error("add a comma after the style param to avoid the miscompilation")]
    NoteAddCommaAfterStyle,
    #[error("the byte count of this value would be miscompiled by the reference compiler because it mixes strings and numbers")]
    VersionValueMixedTypes,
    /// Accompanies [`Reason::VersionValueMixedTypes`].
    #[error("to avoid the miscompilation, specify strings and numbers in separate VALUE statements")]
    NoteVersionValueMixedTypes,
    #[error("the padding of this value would be miscompiled by the reference compiler because the string is not preceded by a comma")]
    VersionValuePadding,
    /// Accompanies [`Reason::VersionValuePadding`].
    #[error("add a comma between the key and the value to avoid the miscompilation")]
    NoteAddCommaAfterKey,
    #[error("the reference compiler rejects the L suffix here, the value is truncated to 16 bits")]
    LanguageLongSuffix,
    #[error("this ASCII character is not equivalent to a virtual key code")]
    AsciiCharacterNotEquivalentToVirtualKey,
    /// Accompanies the unary-plus lex error.
    #[error("the reference compiler accepts unary + inconsistently, remove it for compatible behavior")]
    NoteUnaryPlusUnsupported,
    /// Accompanies the stray-close-paren parse error.
    #[error("the reference compiler would skip the rest of this expression, remove the stray parenthesis")]
    NoteStrayCloseParen,
    /// Accompanies the expression-nested-too-deeply parse error.
    #[error("this is the innermost expression of the too-deep nesting")]
    NoteInnermostExpression,
    /// Accompanies the escaped-quote string error.
    #[error("use \"\" to embed a quote inside a string literal")]
    NoteUseDoubledQuote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub reason: Reason,
    pub span: Span,
}

/// Append-only diagnostic list, threaded through parser and emitter.
#[derive(Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, reason: Reason, span: Span) {
        self.list.push(Diagnostic {
            severity: Severity::Warning,
            reason,
            span,
        });
    }

    pub fn note(&mut self, reason: Reason, span: Span) {
        self.list.push(Diagnostic {
            severity: Severity::Note,
            reason,
            span,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.list.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;
    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}
