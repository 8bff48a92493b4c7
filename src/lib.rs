/*!
This crate compiles Windows Resource Script (`.rc`) source into the binary
`.res` container consumed by linkers. The guiding constraint is byte-for-byte
compatibility with the output of the reference Microsoft compiler, including
its wrapping integer arithmetic, its code-page-dependent character handling
and a number of undocumented quirks. A small set of reference behaviors that
silently produce corrupt output is deliberately *not* reproduced; those
inputs are rejected or warned about instead (see [diagnostics]).

## Compilation stages

1. **Code-page scan** - [`code_page::scan`] makes one pass over the
   preprocessed source and resolves every `#pragma code_page` directive into
   a per-line table of input/output code pages. The pragma lines themselves
   never become tokens.
2. **Tokenization** - [`lexer::Lexer`] produces [`Token`](lexer::Token)s on
   demand. There is no token stream up front: the parser drives the lexer
   and selects a [`LexMode`](lexer::LexMode) per call, because the grammar
   changes how bytes are delimited (resource ids are whitespace-delimited
   runs, expression positions are not). The lexer's state is a single byte
   offset, so the parser can snapshot and rewind it cheaply.
3. **Parsing** - [`parser::parse`] builds a [`Root`](ast::Root) syntax tree
   by recursive descent. The grammar branches on the resource *type* keyword
   discovered per statement. Hard errors abort the parse; compatibility
   warnings accumulate in a [`Diagnostics`](diagnostics::Diagnostics) list.
4. **Emission** - [`emitter::compile`] walks the tree, evaluates
   expressions with [`eval`], reads referenced icon/cursor/bitmap files
   through [`formats`], and writes the `.res` byte stream with explicit
   little-endian field writes.

## Out of scope

The C-style preprocessor (`#include`, macro expansion), comment stripping
and terminal rendering of diagnostics happen outside this crate. The input
is expected to be already-preprocessed text; line markers left behind by the
preprocessor are honored for code-page bookkeeping.
*/

#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod ast;
pub mod code_page;
pub mod diagnostics;
pub mod emitter;
pub mod eval;
pub mod formats;
pub mod lexer;
pub mod literals;
pub mod options;
pub mod parser;
pub mod resolver;
pub mod resources;
