//! MENU / MENUEX emission.
//!
//! Classic menus are a flat stream of `{flags, id?, text}` records where
//! popups recurse inline; extended menus carry 32-bit type/state/id fields
//! and 4-byte alignment per item.

use crate::ast::{Expression, Menu, MenuItem};
use crate::emitter::{pad_to_4, put_u16, put_u32, put_utf16z, Emitter, Result};
use crate::eval::{eval, eval_flags};
use crate::lexer::Token;

const MF_GRAYED: u16 = 0x01;
const MF_INACTIVE: u16 = 0x02;
const MF_CHECKED: u16 = 0x08;
const MF_POPUP: u16 = 0x10;
const MF_MENUBARBREAK: u16 = 0x20;
const MF_MENUBREAK: u16 = 0x40;
const MF_HELP: u16 = 0x4000;
const MF_END: u16 = 0x80;

/// Extended item carries a submenu.
const MFR_POPUP: u16 = 0x01;
const MFR_END: u16 = 0x80;
const MFT_SEPARATOR: u32 = 0x800;

pub fn payload(e: &mut Emitter, menu: &Menu) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if menu.ex {
        put_u16(&mut out, 1); // version
        put_u16(&mut out, 4); // offset to items
        let help_id = menu
            .help_id
            .as_ref()
            .map_or(0, |expression| eval(expression, e.source).value);
        put_u32(&mut out, help_id);
        write_ex_items(e, &mut out, &menu.items)?;
    } else {
        put_u16(&mut out, 0); // version
        put_u16(&mut out, 0); // header size
        write_classic_items(e, &mut out, &menu.items)?;
    }
    Ok(out)
}

fn option_flags(e: &Emitter, options: &[Token]) -> u16 {
    let mut flags = 0;
    for option in options {
        let source = e.source;
        if option.is_keyword(source, "CHECKED") {
            flags |= MF_CHECKED;
        } else if option.is_keyword(source, "GRAYED") {
            flags |= MF_GRAYED;
        } else if option.is_keyword(source, "HELP") {
            flags |= MF_HELP;
        } else if option.is_keyword(source, "INACTIVE") {
            flags |= MF_INACTIVE;
        } else if option.is_keyword(source, "MENUBARBREAK") {
            flags |= MF_MENUBARBREAK;
        } else if option.is_keyword(source, "MENUBREAK") {
            flags |= MF_MENUBREAK;
        }
    }
    flags
}

fn write_classic_items(e: &mut Emitter, out: &mut Vec<u8>, items: &[MenuItem]) -> Result<()> {
    let last = items.len() - 1;
    for (index, item) in items.iter().enumerate() {
        let end = if index == last { MF_END } else { 0 };
        match item {
            MenuItem::Separator { .. } => {
                put_u16(out, end);
                put_u16(out, 0);
                put_u16(out, 0); // empty text
            }
            MenuItem::Item {
                text, id, options, ..
            } => {
                put_u16(out, option_flags(e, options) | end);
                put_u16(out, eval(id, e.source).as_u16());
                let units = e.string_units(*text)?;
                put_utf16z(out, &units);
            }
            MenuItem::Popup {
                text,
                options,
                items,
                ..
            } => {
                put_u16(out, option_flags(e, options) | MF_POPUP | end);
                let units = e.string_units(*text)?;
                put_utf16z(out, &units);
                write_classic_items(e, out, items)?;
            }
            MenuItem::ItemEx { .. } | MenuItem::PopupEx { .. } => unreachable!(),
        }
    }
    Ok(())
}

fn eval_or_zero(e: &Emitter, expression: Option<&Expression>) -> u32 {
    expression.map_or(0, |expression| eval_flags(0, expression, e.source))
}

fn write_ex_items(e: &mut Emitter, out: &mut Vec<u8>, items: &[MenuItem]) -> Result<()> {
    let last = items.len() - 1;
    for (index, item) in items.iter().enumerate() {
        pad_to_4(out);
        let end = if index == last { MFR_END } else { 0 };
        match item {
            MenuItem::Separator { .. } => {
                put_u32(out, MFT_SEPARATOR);
                put_u32(out, 0);
                put_u32(out, 0);
                put_u16(out, end);
                put_u16(out, 0); // empty text
            }
            MenuItem::ItemEx {
                text,
                id,
                item_type,
                state,
                ..
            } => {
                put_u32(out, eval_or_zero(e, item_type.as_ref()));
                put_u32(out, eval_or_zero(e, state.as_ref()));
                put_u32(out, id.as_ref().map_or(0, |id| eval(id, e.source).value));
                put_u16(out, end);
                let units = e.string_units(*text)?;
                put_utf16z(out, &units);
            }
            MenuItem::PopupEx {
                text,
                id,
                item_type,
                state,
                help_id,
                items,
                ..
            } => {
                put_u32(out, eval_or_zero(e, item_type.as_ref()));
                put_u32(out, eval_or_zero(e, state.as_ref()));
                put_u32(out, id.as_ref().map_or(0, |id| eval(id, e.source).value));
                put_u16(out, MFR_POPUP | end);
                let units = e.string_units(*text)?;
                put_utf16z(out, &units);
                pad_to_4(out);
                put_u32(
                    out,
                    help_id
                        .as_ref()
                        .map_or(0, |expression| eval(expression, e.source).value),
                );
                write_ex_items(e, out, items)?;
            }
            MenuItem::Item { .. } | MenuItem::Popup { .. } => unreachable!(),
        }
    }
    Ok(())
}
