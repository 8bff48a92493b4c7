//! One-token lookahead over the lexer.
//!
//! The lexer's position is a single integer, so lookahead is implemented as
//! a snapshot: clone, lex one token, throw the clone away. No token buffer
//! exists; a peek with a different [`LexMode`] re-lexes the same bytes under
//! the new mode, which is exactly what the grammar needs.

use crate::lexer::{LexMode, Lexer, Token};
use crate::parser::{ParseError, Result};

#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Cursor<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self { lexer }
    }

    pub fn source(&self) -> &'a [u8] {
        self.lexer.source()
    }

    pub fn next(&mut self, mode: LexMode) -> Result<Token> {
        self.lexer.next(mode).map_err(ParseError::from)
    }

    pub fn peek(&self, mode: LexMode) -> Result<Token> {
        self.lexer.clone().next(mode).map_err(ParseError::from)
    }

    /// Consumes the next token if `predicate` approves it.
    pub fn next_if(
        &mut self,
        mode: LexMode,
        predicate: impl FnOnce(&Token, &[u8]) -> bool,
    ) -> Result<Option<Token>> {
        let token = self.peek(mode)?;
        if predicate(&token, self.source()) {
            self.lexer.next(mode).map_err(ParseError::from)?;
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }
}
