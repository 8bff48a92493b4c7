//! The code-page-aware, mode-driven tokenizer.
//!
//! Unlike a conventional lexer there is no fixed token grammar: the parser
//! picks a [`LexMode`] for every [`Lexer::next`] call because the resource
//! script grammar delimits bytes differently depending on position. A
//! resource id is "everything up to the next whitespace", an expression
//! position distinguishes unary from binary `-`, and so on.
//!
//! The lexer's entire state is a byte offset plus line bookkeeping, so the
//! parser snapshots it by cloning and rewinds by dropping the clone.

mod cursor;
mod lexer_error;
#[cfg(test)]
mod lexer_tests;
mod token;

use cursor::Cursor;
pub use lexer_error::{LexError, LexErrorKind};
pub use token::{Token, TokenId};

use crate::diagnostics::Span;

/// How the next token is delimited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LexMode {
    /// Every run of non-whitespace bytes is one literal token. Used for
    /// resource ids and type keywords.
    WhitespaceDelimiterOnly,
    /// Full token grammar; `+` is rejected and `-`/`~` begin a number.
    Normal,
    /// Full token grammar at a position where a primary expression has
    /// already been read, so `+` and `-` are binary operators.
    NormalExpectOperator,
}

/// End-of-input marker byte, honored anywhere outside a string literal.
const SUBSTITUTE: u8 = 0x1A;

#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.cursor.source()
    }

    pub fn next(&mut self, mode: LexMode) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let start = self.cursor.pos();
        let line = self.cursor.line();
        let token = |id, end| Token {
            id,
            start,
            end,
            line,
        };

        let Some(byte) = self.cursor.peek() else {
            return Ok(token(TokenId::Eof, start));
        };
        if byte == SUBSTITUTE {
            return Ok(token(TokenId::Eof, start));
        }
        self.cursor.mark_token_start();

        if mode == LexMode::WhitespaceDelimiterOnly {
            while let Some(byte) = self.cursor.peek() {
                if is_whitespace(byte) || byte == b';' || byte == SUBSTITUTE {
                    break;
                }
                self.cursor.take();
            }
            return Ok(token(TokenId::Literal, self.cursor.pos()));
        }

        match byte {
            b'"' => self.lex_string(start, line),
            b'L' | b'l' if self.cursor.peek_2nd() == Some(b'"') => {
                self.cursor.take();
                self.lex_string(start, line)
            }
            b'0'..=b'9' => self.lex_number(start, line),
            b'-' | b'~' if mode == LexMode::Normal => self.lex_number(start, line),
            b'+' if mode == LexMode::Normal => {
                Err(LexErrorKind::UnaryPlus.at(Span::new(start, start + 1, line)))
            }
            b'+' | b'-' | b'|' | b'&' | b'~' => {
                self.cursor.take();
                Ok(token(TokenId::Operator, self.cursor.pos()))
            }
            b',' => {
                self.cursor.take();
                Ok(token(TokenId::Comma, self.cursor.pos()))
            }
            b'(' => {
                self.cursor.take();
                Ok(token(TokenId::OpenParen, self.cursor.pos()))
            }
            b')' => {
                self.cursor.take();
                Ok(token(TokenId::CloseParen, self.cursor.pos()))
            }
            b'{' => {
                self.cursor.take();
                Ok(token(TokenId::OpenBrace, self.cursor.pos()))
            }
            b'}' => {
                self.cursor.take();
                Ok(token(TokenId::CloseBrace, self.cursor.pos()))
            }
            _ => {
                while let Some(byte) = self.cursor.peek() {
                    if is_literal_delimiter(byte) {
                        break;
                    }
                    self.cursor.take();
                }
                let end = self.cursor.pos();
                let slice = &self.cursor.source()[start..end];
                let id = if slice.eq_ignore_ascii_case(b"BEGIN") {
                    TokenId::OpenBrace
                } else if slice.eq_ignore_ascii_case(b"END") {
                    TokenId::CloseBrace
                } else {
                    TokenId::Literal
                };
                Ok(token(id, end))
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(byte) = self.cursor.peek() {
            if is_whitespace(byte) {
                self.cursor.take();
            } else if byte == b';' {
                self.cursor.skip_to_eol();
            } else if byte == b'#' && !self.cursor.line_has_tokens() {
                // A preprocessor leftover: `#pragma code_page` was already
                // resolved by the code-page scan, line markers only matter
                // there too. Neither produces a token.
                self.cursor.skip_to_eol();
            } else {
                break;
            }
        }
    }

    fn lex_number(&mut self, start: usize, line: u32) -> Result<Token, LexError> {
        while matches!(self.cursor.peek(), Some(b'-' | b'~')) {
            self.cursor.take();
        }
        if !matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
            let pos = self.cursor.pos();
            return Err(LexErrorKind::ExpectedNumber.at(Span::new(start, pos + 1, line)));
        }

        let digits_start = self.cursor.pos();
        let hex = self.cursor.peek() == Some(b'0')
            && matches!(self.cursor.peek_2nd(), Some(b'x' | b'X'));
        if hex {
            self.cursor.take();
            self.cursor.take();
        }
        // Dots and underscores stay inside the token so that filenames with
        // a leading digit (`1.ico`) survive as one unit; number evaluation
        // simply stops at the first non-digit.
        while let Some(byte) = self.cursor.peek() {
            if !(byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'_') {
                break;
            }
            if !hex && matches!(byte, b'e' | b'E') {
                if matches!(self.cursor.peek_2nd(), Some(b'0'..=b'9')) {
                    let pos = self.cursor.pos();
                    return Err(LexErrorKind::NumberExponent.at(Span::new(
                        digits_start,
                        pos + 1,
                        line,
                    )));
                }
                break;
            }
            self.cursor.take();
        }
        Ok(Token {
            id: TokenId::Number,
            start,
            end: self.cursor.pos(),
            line,
        })
    }

    /// Lexes a quoted string starting at the opening quote (any `L` prefix
    /// already consumed). A doubled quote stays inside the token; a lone
    /// quote always closes it, even after a backslash.
    fn lex_string(&mut self, start: usize, line: u32) -> Result<Token, LexError> {
        self.cursor.take();
        loop {
            let Some(byte) = self.cursor.peek() else {
                return Err(
                    LexErrorKind::UnterminatedString.at(Span::new(start, self.cursor.pos(), line))
                );
            };
            if byte == SUBSTITUTE {
                return Err(
                    LexErrorKind::UnterminatedString.at(Span::new(start, self.cursor.pos(), line))
                );
            }
            self.cursor.take();
            if byte == b'"' {
                if self.cursor.peek() == Some(b'"') {
                    self.cursor.take();
                    continue;
                }
                break;
            }
        }
        let wide = (self.cursor.source()[start] | 0x20) == b'l';
        Ok(Token {
            id: if wide {
                TokenId::QuotedWideString
            } else {
                TokenId::QuotedAsciiString
            },
            start,
            end: self.cursor.pos(),
            line,
        })
    }
}

/// Whitespace is every ASCII control byte that is not the 0x1A end-of-input
/// marker, plus the space character. The reference compiler is this
/// permissive outside string literals.
fn is_whitespace(byte: u8) -> bool {
    byte == b' ' || (byte < 0x20 && byte != SUBSTITUTE)
}

fn is_literal_delimiter(byte: u8) -> bool {
    is_whitespace(byte)
        || matches!(
            byte,
            b'"' | b',' | b'(' | b')' | b'{' | b'}' | b';' | b'+' | b'-' | b'|' | b'&' | b'~'
        )
        || byte == SUBSTITUTE
}
