//! DIALOG / DIALOGEX emission.
//!
//! The classic template puts style before exstyle; the extended template
//! leads with help id, exstyle, style and widens control ids to 32 bits.
//! Every control starts on a 4-byte boundary.

use crate::ast::{Control, ControlKind, Dialog, Expression, NameValue};
use crate::code_page::CodePage;
use crate::emitter::{pad_to_4, put_u16, put_u32, put_utf16z, Emitter, Result};
use crate::eval::{eval, eval_flags};
use crate::lexer::TokenId;
use crate::literals::{NameOrOrdinal, MAX_NAME_CODE_UNITS};
use crate::resources::control_class;

pub const DS_SETFONT: u32 = 0x40;
pub const WS_CAPTION: u32 = 0x00C0_0000;
const WS_BORDER: u32 = 0x0080_0000;
const WS_CHILD: u32 = 0x4000_0000;
const WS_VISIBLE: u32 = 0x1000_0000;
const WS_GROUP: u32 = 0x0002_0000;
const WS_TABSTOP: u32 = 0x0001_0000;

/// Style of a dialog that has no STYLE statement: WS_POPUP, WS_BORDER and
/// WS_SYSMENU.
const DEFAULT_DIALOG_STYLE: u32 = 0x8088_0000;

pub fn payload(e: &mut Emitter, dialog: &Dialog) -> Result<Vec<u8>> {
    let source = e.source;
    let mut style = match &dialog.style {
        Some(expression) => eval_flags(0, expression, source),
        None => DEFAULT_DIALOG_STYLE,
    };
    if dialog.font.is_some() {
        style |= DS_SETFONT;
    }
    if dialog.caption.is_some() {
        style |= WS_CAPTION;
    }
    let exstyle = dialog
        .exstyle
        .as_ref()
        .map_or(0, |expression| eval_flags(0, expression, source));
    let help_id = dialog
        .help_id
        .as_ref()
        .map_or(0, |expression| eval(expression, source).value);

    let mut out = Vec::new();
    if dialog.ex {
        put_u16(&mut out, 1); // version
        put_u16(&mut out, 0xFFFF); // extended template signature
        put_u32(&mut out, help_id);
        put_u32(&mut out, exstyle);
        put_u32(&mut out, style);
    } else {
        put_u32(&mut out, style);
        put_u32(&mut out, exstyle);
    }
    put_u16(&mut out, dialog.controls.len() as u16);
    put_u16(&mut out, eval(&dialog.x, source).as_u16());
    put_u16(&mut out, eval(&dialog.y, source).as_u16());
    put_u16(&mut out, eval(&dialog.width, source).as_u16());
    put_u16(&mut out, eval(&dialog.height, source).as_u16());

    write_name_value(e, &mut out, dialog.menu.as_ref(), true)?;
    write_name_value(e, &mut out, dialog.class.as_ref(), false)?;

    match dialog.caption {
        Some(token) => {
            let units = e.string_units(token)?;
            put_utf16z(&mut out, &units);
        }
        None => put_u16(&mut out, 0),
    }

    if let Some(font) = &dialog.font {
        put_u16(&mut out, eval(&font.point_size, source).as_u16());
        if dialog.ex {
            let weight = font
                .weight
                .as_ref()
                .map_or(0, |expression| eval(expression, source).as_u16());
            let italic = font
                .italic
                .as_ref()
                .map_or(0, |expression| eval(expression, source).as_u16());
            let charset = font
                .charset
                .as_ref()
                .map_or(1, |expression| eval(expression, source).as_u16());
            put_u16(&mut out, weight);
            out.push(italic as u8);
            out.push(charset as u8);
        }
        let units = e.string_units(font.typeface)?;
        put_utf16z(&mut out, &units);
    }

    for control in &dialog.controls {
        pad_to_4(&mut out);
        write_control(e, &mut out, control, dialog.ex)?;
    }
    Ok(out)
}

/// Writes the menu or class field of the dialog header.
///
/// Menu values are resource references and go through ordinary
/// name-or-ordinal classification (uppercased); class names are window
/// class strings and are written verbatim.
fn write_name_value(
    e: &mut Emitter,
    out: &mut Vec<u8>,
    value: Option<&NameValue>,
    uppercase: bool,
) -> Result<()> {
    let Some(value) = value else {
        put_u16(out, 0);
        return Ok(());
    };
    if let Some(ordinal) = value.ordinal {
        put_u16(out, 0xFFFF);
        put_u16(out, ordinal);
        return Ok(());
    }
    let slice = value.token.slice(e.source);
    let input = e.code_pages.input(value.token.line);
    if slice.first() == Some(&b'"') || slice.starts_with(b"L\"") || slice.starts_with(b"l\"") {
        let mut units = e.string_units(value.token)?;
        if uppercase {
            ascii_uppercase_units(&mut units);
        }
        units.truncate(MAX_NAME_CODE_UNITS);
        put_utf16z(out, &units);
        return Ok(());
    }
    if uppercase {
        match NameOrOrdinal::from_text(slice, input) {
            NameOrOrdinal::Ordinal(ordinal) => {
                put_u16(out, 0xFFFF);
                put_u16(out, ordinal);
            }
            NameOrOrdinal::Name(units) => put_utf16z(out, &units),
        }
        return Ok(());
    }
    let units = decode_units(input, slice);
    put_utf16z(out, &units);
    Ok(())
}

fn ascii_uppercase_units(units: &mut [u16]) {
    for unit in units {
        if (0x61..=0x7A).contains(unit) {
            *unit -= 0x20;
        }
    }
}

fn decode_units(input: CodePage, slice: &[u8]) -> Vec<u16> {
    let mut units = Vec::new();
    for decoded in input.decode_all(slice) {
        let c = char::from_u32(decoded.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
        let mut buf = [0u16; 2];
        units.extend_from_slice(c.encode_utf16(&mut buf));
    }
    units
}

impl ControlKind {
    /// Class ordinal of the sugar control statements.
    fn class_ordinal(self) -> Option<u16> {
        match self {
            Self::AutoCheckBox
            | Self::AutoRadioButton
            | Self::Auto3State
            | Self::CheckBox
            | Self::DefPushButton
            | Self::GroupBox
            | Self::PushBox
            | Self::PushButton
            | Self::RadioButton
            | Self::State3
            | Self::UserButton => Some(control_class::BUTTON),
            Self::CText | Self::LText | Self::RText | Self::Icon => Some(control_class::STATIC),
            Self::EditText => Some(control_class::EDIT),
            Self::ComboBox => Some(control_class::COMBOBOX),
            Self::ListBox => Some(control_class::LISTBOX),
            Self::ScrollBar => Some(control_class::SCROLLBAR),
            Self::Control => None,
        }
    }

    /// Implicit style bits; every control additionally gets WS_CHILD and
    /// WS_VISIBLE.
    fn default_style(self) -> u32 {
        match self {
            Self::PushButton => WS_TABSTOP,
            Self::DefPushButton => 0x1 | WS_TABSTOP,
            Self::CheckBox => 0x2 | WS_TABSTOP,
            Self::AutoCheckBox => 0x3 | WS_TABSTOP,
            Self::RadioButton => 0x4,
            Self::State3 => 0x5 | WS_TABSTOP,
            Self::Auto3State => 0x6 | WS_TABSTOP,
            Self::GroupBox => 0x7,
            Self::UserButton => 0x8 | WS_TABSTOP,
            Self::AutoRadioButton => 0x9,
            Self::PushBox => 0xA | WS_TABSTOP,
            Self::LText => WS_GROUP,
            Self::CText => 0x1 | WS_GROUP,
            Self::RText => 0x2 | WS_GROUP,
            Self::Icon => 0x3,
            Self::EditText => WS_BORDER | WS_TABSTOP,
            Self::ComboBox => 0x1 | WS_TABSTOP,
            Self::ListBox => 0x1 | WS_BORDER,
            Self::ScrollBar | Self::Control => 0,
        }
    }
}

fn write_control(e: &mut Emitter, out: &mut Vec<u8>, control: &Control, ex: bool) -> Result<()> {
    let source = e.source;
    let default_style = control.kind.default_style() | WS_CHILD | WS_VISIBLE;
    let style = control
        .style
        .as_ref()
        .map_or(default_style, |expression| {
            eval_flags(default_style, expression, source)
        });
    let exstyle = control
        .exstyle
        .as_ref()
        .map_or(0, |expression| eval_flags(0, expression, source));
    let help_id = control
        .help_id
        .as_ref()
        .map_or(0, |expression| eval(expression, source).value);

    if ex {
        put_u32(out, help_id);
        put_u32(out, exstyle);
        put_u32(out, style);
    } else {
        put_u32(out, style);
        put_u32(out, exstyle);
    }
    put_u16(out, eval(&control.x, source).as_u16());
    put_u16(out, eval(&control.y, source).as_u16());
    put_u16(out, eval(&control.width, source).as_u16());
    put_u16(out, eval(&control.height, source).as_u16());
    let id = eval(&control.id, source);
    if ex {
        put_u32(out, id.value);
    } else {
        put_u16(out, id.as_u16());
    }

    // Class field.
    match control.kind.class_ordinal() {
        Some(ordinal) => {
            put_u16(out, 0xFFFF);
            put_u16(out, ordinal);
        }
        None => {
            let token = control.class.expect("generic CONTROL always has a class");
            let slice = token.slice(source);
            if let Some(ordinal) = predefined_class_ordinal(slice) {
                put_u16(out, 0xFFFF);
                put_u16(out, ordinal);
            } else if token.is_string() {
                let units = e.string_units(token)?;
                put_utf16z(out, &units);
            } else if token.id == TokenId::Number {
                put_u16(out, 0xFFFF);
                put_u16(out, crate::literals::parse_number(slice).as_u16());
            } else {
                let input = e.code_pages.input(token.line);
                put_utf16z(out, &decode_units(input, slice));
            }
        }
    }

    // Title field: a number is an ordinal reference (icon controls), text
    // is written verbatim.
    match control.text {
        Some(token) if token.id == TokenId::Number => {
            put_u16(out, 0xFFFF);
            put_u16(out, crate::literals::parse_number(token.slice(source)).as_u16());
        }
        Some(token) => {
            let units = e.string_units(token)?;
            put_utf16z(out, &units);
        }
        None => put_u16(out, 0),
    }

    // Creation data, prefixed by its byte count.
    if control.creation_data.is_empty() {
        put_u16(out, 0);
    } else {
        let data = super::raw_data_bytes(e, &control.creation_data)?;
        put_u16(out, data.len() as u16);
        out.extend_from_slice(&data);
    }
    Ok(())
}

fn predefined_class_ordinal(slice: &[u8]) -> Option<u16> {
    const CLASSES: [(&[u8], u16); 6] = [
        (b"BUTTON", control_class::BUTTON),
        (b"EDIT", control_class::EDIT),
        (b"STATIC", control_class::STATIC),
        (b"LISTBOX", control_class::LISTBOX),
        (b"SCROLLBAR", control_class::SCROLLBAR),
        (b"COMBOBOX", control_class::COMBOBOX),
    ];
    let trimmed = slice.strip_prefix(b"\"").unwrap_or(slice);
    let trimmed = trimmed.strip_suffix(b"\"").unwrap_or(trimmed);
    CLASSES
        .iter()
        .find(|(name, _)| trimmed.eq_ignore_ascii_case(name))
        .map(|(_, ordinal)| *ordinal)
}
