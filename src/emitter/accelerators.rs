//! ACCELERATORS table emission.
//!
//! The payload is an array of 8-byte entries; the last entry is flagged
//! with bit 0x80. The event field comes from the accelerator-key algorithm
//! over the entry's key string (or directly from a number).

use crate::ast::{Accelerators, Expression};
use crate::diagnostics::Reason;
use crate::emitter::{put_u16, CompileErrorKind, Emitter, Result};
use crate::eval::eval;

pub const FVIRTKEY: u16 = 0x01;
pub const FNOINVERT: u16 = 0x02;
pub const FSHIFT: u16 = 0x04;
pub const FCONTROL: u16 = 0x08;
pub const FALT: u16 = 0x10;
const LAST_ENTRY: u16 = 0x80;

pub fn payload(e: &mut Emitter, table: &Accelerators) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(table.entries.len() * 8);
    let last = table.entries.len().saturating_sub(1);
    for (index, entry) in table.entries.iter().enumerate() {
        let mut flags = 0u16;
        let mut virtkey = false;
        let mut ascii = false;
        for modifier in &entry.modifiers {
            let source = e.source;
            if modifier.is_keyword(source, "VIRTKEY") {
                virtkey = true;
                flags |= FVIRTKEY;
            } else if modifier.is_keyword(source, "ASCII") {
                ascii = true;
            } else if modifier.is_keyword(source, "SHIFT") {
                flags |= FSHIFT;
            } else if modifier.is_keyword(source, "CONTROL") {
                flags |= FCONTROL;
            } else if modifier.is_keyword(source, "ALT") {
                flags |= FALT;
            } else if modifier.is_keyword(source, "NOINVERT") {
                flags |= FNOINVERT;
            }
            if virtkey && ascii {
                return Err(CompileErrorKind::AcceleratorTypeConflict.at(modifier.span()));
            }
        }

        let event = event_value(e, &entry.event, virtkey)?;
        if index == last {
            flags |= LAST_ENTRY;
        }
        put_u16(&mut out, flags);
        put_u16(&mut out, event);
        put_u16(&mut out, eval(&entry.id, e.source).as_u16());
        put_u16(&mut out, 0);
    }
    Ok(out)
}

/// The accelerator-key algorithm, operating on UTF-16 code units.
///
/// `"^X"` maps the letter into the 1..26 control range; `"^^"` is a
/// literal caret. One unit is the unit itself (uppercased for virtual
/// keys), two units pack big-endianly into one u16. A third unit is only
/// tolerated when it is NUL.
fn event_value(e: &mut Emitter, event: &Expression, virtkey: bool) -> Result<u16> {
    let Expression::Literal(token) = event else {
        return Ok(eval(event, e.source).as_u16());
    };
    if !token.is_string() {
        return Ok(eval(event, e.source).as_u16());
    }

    let span = token.span();
    let mut units = e.string_units(*token)?;
    if units.len() == 3 && units[2] == 0 {
        units.truncate(2);
    }
    match units.as_slice() {
        [] => Err(CompileErrorKind::EmptyAcceleratorKey.at(span)),
        [0x5E] => Err(CompileErrorKind::InvalidControlCharacter.at(span)),
        [0x5E, 0x5E] => Ok(u16::from(b'^')),
        [0x5E, c] => {
            let upper = match *c {
                0x41..=0x5A => *c,
                0x61..=0x7A => *c - 0x20,
                _ => return Err(CompileErrorKind::InvalidControlCharacter.at(span)),
            };
            if virtkey {
                e.diagnostics
                    .warn(Reason::AsciiCharacterNotEquivalentToVirtualKey, span);
            }
            Ok(upper - 0x40)
        }
        [c] => {
            if virtkey {
                Ok(to_ascii_upper_unit(*c))
            } else {
                Ok(*c)
            }
        }
        [first, second] => Ok((*first << 8) | *second),
        _ => Err(CompileErrorKind::AcceleratorKeyTooLong.at(span)),
    }
}

fn to_ascii_upper_unit(unit: u16) -> u16 {
    if (0x61..=0x7A).contains(&unit) {
        unit - 0x20
    } else {
        unit
    }
}
