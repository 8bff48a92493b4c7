//! Quoted string literal evaluation.
//!
//! Narrow strings (`"..."`) decode through the input code page and
//! re-encode through the output code page; wide strings (`L"..."`) decode
//! the same way but produce UTF-16 code units directly. Escape handling is
//! shared; only the width of `\x`/octal escapes differs.

use thiserror::Error;

use crate::code_page::CodePage;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum StringError {
    #[error("escaping quotes with \\\" is not allowed")]
    EscapedQuote,
    #[error("string literal exceeds the maximum of {limit} code units")]
    TooLong { limit: u32 },
}

enum Piece {
    /// A decoded codepoint, re-encoded per output width.
    Codepoint(u32),
    /// A `\x`/octal escape value, written through as-is.
    Escape(u16),
}

/// Evaluates a narrow string literal into its on-disk bytes.
///
/// `bytes` is the full token slice including quotes. No terminator is
/// appended.
pub fn parse_narrow_string(
    bytes: &[u8],
    input: CodePage,
    output: CodePage,
    max_code_units: u32,
) -> Result<Vec<u8>, StringError> {
    let pieces = parse_contents(contents_of(bytes), input, false, max_code_units)?;
    let mut out = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Codepoint(cp) => output.encode_narrow(cp, &mut out),
            Piece::Escape(value) => out.push(value as u8),
        }
    }
    Ok(out)
}

/// Evaluates a wide string literal into UTF-16 code units. No terminator is
/// appended.
pub fn parse_wide_string(
    bytes: &[u8],
    input: CodePage,
    max_code_units: u32,
) -> Result<Vec<u16>, StringError> {
    let pieces = parse_contents(contents_of(bytes), input, true, max_code_units)?;
    let mut out = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Codepoint(cp) => match char::from_u32(cp) {
                Some(c) => {
                    let mut buf = [0u16; 2];
                    out.extend_from_slice(c.encode_utf16(&mut buf));
                }
                None => out.push(0xFFFD),
            },
            Piece::Escape(value) => out.push(value),
        }
    }
    Ok(out)
}

/// Strips the optional `L` prefix and the surrounding quotes.
fn contents_of(bytes: &[u8]) -> &[u8] {
    let bytes = match bytes.first() {
        Some(b'L' | b'l') => &bytes[1..],
        _ => bytes,
    };
    let bytes = bytes.strip_prefix(b"\"").unwrap_or(bytes);
    bytes.strip_suffix(b"\"").unwrap_or(bytes)
}

fn parse_contents(
    contents: &[u8],
    input: CodePage,
    wide: bool,
    max_code_units: u32,
) -> Result<Vec<Piece>, StringError> {
    let mut pieces = Vec::new();
    let mut code_units = 0u32;
    let mut rest = contents;

    while let Some(decoded) = input.decode(rest) {
        let len = decoded.byte_len as usize;
        match decoded.codepoint {
            0x5C => {
                // backslash
                rest = &rest[len..];
                rest = parse_escape(rest, wide, &mut pieces, &mut code_units)?;
            }
            0x22 => {
                // A doubled quote embeds a single one; the lexer guarantees
                // a lone quote cannot appear inside the contents.
                rest = &rest[len..];
                if let Some(tail) = rest.strip_prefix(b"\"") {
                    rest = tail;
                }
                pieces.push(Piece::Codepoint(0x22));
                code_units += 1;
            }
            0x0A | 0x0D => {
                // A newline and the following line's leading whitespace
                // collapse into a single space.
                rest = &rest[len..];
                while let Some((&b, tail)) = rest.split_first() {
                    if matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C) {
                        rest = tail;
                    } else {
                        break;
                    }
                }
                pieces.push(Piece::Codepoint(0x20));
                code_units += 1;
            }
            cp => {
                rest = &rest[len..];
                pieces.push(Piece::Codepoint(cp));
                code_units += utf16_width(cp);
            }
        }
        if code_units > max_code_units {
            return Err(StringError::TooLong {
                limit: max_code_units,
            });
        }
    }

    Ok(pieces)
}

/// Handles the byte run after a backslash. Returns the remaining input.
fn parse_escape<'a>(
    rest: &'a [u8],
    wide: bool,
    pieces: &mut Vec<Piece>,
    code_units: &mut u32,
) -> Result<&'a [u8], StringError> {
    let Some((&b, tail)) = rest.split_first() else {
        // The contents can only end on a backslash when the literal was
        // written as `\"`: the quote closed the string, leaving the
        // backslash pending.
        return Err(StringError::EscapedQuote);
    };
    match b {
        b'"' => Err(StringError::EscapedQuote),
        b'n' | b'N' => {
            pieces.push(Piece::Codepoint(0x0A));
            *code_units += 1;
            Ok(tail)
        }
        b'r' | b'R' => {
            pieces.push(Piece::Codepoint(0x0D));
            *code_units += 1;
            Ok(tail)
        }
        b't' | b'T' => {
            pieces.push(Piece::Codepoint(0x09));
            *code_units += 1;
            Ok(tail)
        }
        b'a' | b'A' => {
            pieces.push(Piece::Codepoint(0x07));
            *code_units += 1;
            Ok(tail)
        }
        b'b' | b'B' => {
            pieces.push(Piece::Codepoint(0x08));
            *code_units += 1;
            Ok(tail)
        }
        b'\\' => {
            pieces.push(Piece::Codepoint(0x5C));
            *code_units += 1;
            Ok(tail)
        }
        b'x' | b'X' => {
            let mut value = 0u16;
            let mut digits = 0;
            let mut rest = tail;
            while digits < 2 {
                let Some((&d, t)) = rest.split_first() else {
                    break;
                };
                let Some(hex) = hex_digit(d) else { break };
                value = value.wrapping_mul(16).wrapping_add(u16::from(hex));
                digits += 1;
                rest = t;
            }
            if digits == 0 {
                // No hex digits: the escape is not recognized, both
                // characters stay literal.
                pieces.push(Piece::Codepoint(0x5C));
                pieces.push(Piece::Codepoint(u32::from(b)));
                *code_units += 2;
                return Ok(tail);
            }
            pieces.push(Piece::Escape(value));
            *code_units += 1;
            Ok(rest)
        }
        b'\n' | b'\r' => {
            // A backslash at end of line does not join lines: the
            // backslash stays data and the newline run plus the next
            // line's leading whitespace collapses to a single space.
            let mut rest = tail;
            while let Some((&w, t)) = rest.split_first() {
                if matches!(w, b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C) {
                    rest = t;
                } else {
                    break;
                }
            }
            pieces.push(Piece::Codepoint(0x5C));
            pieces.push(Piece::Codepoint(0x20));
            *code_units += 2;
            Ok(rest)
        }
        b'0'..=b'7' => {
            let mut value = 0u16;
            let mut digits = 0;
            // The first octal digit is `b` itself.
            let mut rest = rest;
            while digits < 3 {
                let Some((&d, t)) = rest.split_first() else {
                    break;
                };
                if !(b'0'..=b'7').contains(&d) {
                    break;
                }
                value = value.wrapping_mul(8).wrapping_add(u16::from(d - b'0'));
                digits += 1;
                rest = t;
            }
            let value = if wide { value } else { value % 256 };
            pieces.push(Piece::Escape(value));
            *code_units += 1;
            Ok(rest)
        }
        _ => {
            // Unrecognized escape: backslash and character stay literal.
            pieces.push(Piece::Codepoint(0x5C));
            pieces.push(Piece::Codepoint(u32::from(b)));
            *code_units += 2;
            Ok(tail)
        }
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn utf16_width(codepoint: u32) -> u32 {
    if codepoint >= 0x1_0000 {
        2
    } else {
        1
    }
}
