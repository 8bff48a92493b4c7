//! VERSIONINFO emission.
//!
//! A version resource is a tree of length-prefixed blocks. Every node is
//! `{length, value_length, type, key, pad, value, children}`; lengths are
//! backpatched after the node's subtree has been written. The fixed
//! `VS_FIXEDFILEINFO` struct is the root node's value.

use crate::ast::{Expression, VersionFixed, VersionFixedKind, VersionInfo, VersionNode};
use crate::diagnostics::Reason;
use crate::emitter::{pad_to_4, put_u16, put_u32, put_utf16z, Emitter, Result};
use crate::eval::eval;

const SIGNATURE: u32 = 0xFEEF_04BD;
const STRUC_VERSION: u32 = 0x0001_0000;
const FIXED_INFO_LEN: u16 = 52;
const ROOT_KEY: &str = "VS_VERSION_INFO";

pub fn payload(e: &mut Emitter, info: &VersionInfo) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let start = begin_node(&mut out, ROOT_KEY.encode_utf16().collect::<Vec<u16>>().as_slice());
    // value_length of the root covers the fixed info, in bytes.
    patch_u16(&mut out, start + 2, FIXED_INFO_LEN);
    out[start + 4] = 0; // binary value

    pad_to_4(&mut out);
    write_fixed_info(e, &mut out, &info.fixed);

    for node in &info.blocks {
        write_node(e, &mut out, node)?;
    }
    finish_node(&mut out, start);
    Ok(out)
}

/// Writes the common node prefix with a zero length placeholder, returning
/// the node's start offset.
fn begin_node(out: &mut Vec<u8>, key_units: &[u16]) -> usize {
    let start = out.len();
    put_u16(out, 0); // length, patched by finish_node
    put_u16(out, 0); // value_length
    put_u16(out, 1); // type: text unless overwritten
    put_utf16z(out, key_units);
    start
}

fn finish_node(out: &mut Vec<u8>, start: usize) {
    let length = (out.len() - start) as u16;
    patch_u16(out, start, length);
}

fn patch_u16(out: &mut [u8], offset: usize, value: u16) {
    out[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn write_fixed_info(e: &Emitter, out: &mut Vec<u8>, fixed: &[VersionFixed]) {
    let mut file_version = [0u16; 4];
    let mut product_version = [0u16; 4];
    let mut flags_mask = 0u32;
    let mut flags = 0u32;
    let mut os = 0u32;
    let mut file_type = 0u32;
    let mut subtype = 0u32;

    for statement in fixed {
        let mut scalar = |parts: &[Expression]| {
            parts
                .first()
                .map_or(0, |expression| eval(expression, e.source).value)
        };
        match statement.kind {
            VersionFixedKind::FileVersion => {
                version_parts(e, &statement.parts, &mut file_version);
            }
            VersionFixedKind::ProductVersion => {
                version_parts(e, &statement.parts, &mut product_version);
            }
            VersionFixedKind::FileFlagsMask => flags_mask = scalar(&statement.parts),
            VersionFixedKind::FileFlags => flags = scalar(&statement.parts),
            VersionFixedKind::FileOs => os = scalar(&statement.parts),
            VersionFixedKind::FileType => file_type = scalar(&statement.parts),
            VersionFixedKind::FileSubtype => subtype = scalar(&statement.parts),
        }
    }

    put_u32(out, SIGNATURE);
    put_u32(out, STRUC_VERSION);
    put_u32(out, (u32::from(file_version[0]) << 16) | u32::from(file_version[1]));
    put_u32(out, (u32::from(file_version[2]) << 16) | u32::from(file_version[3]));
    put_u32(
        out,
        (u32::from(product_version[0]) << 16) | u32::from(product_version[1]),
    );
    put_u32(
        out,
        (u32::from(product_version[2]) << 16) | u32::from(product_version[3]),
    );
    put_u32(out, flags_mask);
    put_u32(out, flags);
    put_u32(out, os);
    put_u32(out, file_type);
    put_u32(out, subtype);
    put_u32(out, 0); // date, high
    put_u32(out, 0); // date, low
}

fn version_parts(e: &Emitter, parts: &[Expression], into: &mut [u16; 4]) {
    for (slot, expression) in into.iter_mut().zip(parts) {
        *slot = eval(expression, e.source).as_u16();
    }
}

fn write_node(e: &mut Emitter, out: &mut Vec<u8>, node: &VersionNode) -> Result<()> {
    pad_to_4(out);
    match node {
        VersionNode::Block { key, children, .. } => {
            let units = e.string_units(*key)?;
            let start = begin_node(out, &units);
            for child in children {
                write_node(e, out, child)?;
            }
            finish_node(out, start);
        }
        VersionNode::Value { key, values, .. } => {
            let units = e.string_units(*key)?;
            let key_span = key.span();
            let start = begin_node(out, &units);

            let has_string = values
                .iter()
                .any(|v| matches!(&v.expression, Expression::Literal(t) if t.is_string()));
            let has_number = values
                .iter()
                .any(|v| !matches!(&v.expression, Expression::Literal(t) if t.is_string()));
            if has_string && has_number {
                // The reference compiler writes a nonsensical byte count
                // here; refuse to reproduce it.
                e.diagnostics.warn(Reason::VersionValueMixedTypes, key_span);
                e.diagnostics
                    .note(Reason::NoteVersionValueMixedTypes, key_span);
            }

            pad_to_4(out);
            let value_start = out.len();
            let mut code_units = 0u16;
            for value in values {
                match &value.expression {
                    Expression::Literal(token) if token.is_string() => {
                        if !value.preceded_by_comma {
                            e.diagnostics
                                .warn(Reason::VersionValuePadding, token.span());
                            e.diagnostics
                                .note(Reason::NoteAddCommaAfterKey, token.span());
                        }
                        let units = e.string_units(*token)?;
                        put_utf16z(out, &units);
                        code_units += units.len() as u16 + 1;
                    }
                    expression => {
                        let number = eval(expression, e.source);
                        if number.is_long {
                            put_u32(out, number.value);
                        } else {
                            put_u16(out, number.as_u16());
                        }
                    }
                }
            }

            let value_bytes = (out.len() - value_start) as u16;
            let text = has_string && !has_number;
            // Text values count UTF-16 code units, binary values count
            // bytes.
            patch_u16(out, start + 2, if text { code_units } else { value_bytes });
            if !text {
                patch_u16(out, start + 4, 0);
            }
            finish_node(out, start);
        }
    }
    Ok(())
}
