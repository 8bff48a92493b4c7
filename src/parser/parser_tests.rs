use super::*;
use crate::code_page::{CodePage, CodePageLookup};
use crate::diagnostics::Diagnostics;

fn parse_ok(source: &[u8]) -> Root {
    let lookup = CodePageLookup::uniform(CodePage::Windows1252);
    let mut diagnostics = Diagnostics::new();
    parse(source, &lookup, &mut diagnostics).expect("parse should succeed")
}

fn parse_err(source: &[u8]) -> ParseError {
    let lookup = CodePageLookup::uniform(CodePage::Windows1252);
    let mut diagnostics = Diagnostics::new();
    parse(source, &lookup, &mut diagnostics).expect_err("parse should fail")
}

fn parse_with_diagnostics(source: &[u8]) -> (Root, Diagnostics) {
    let lookup = CodePageLookup::uniform(CodePage::Windows1252);
    let mut diagnostics = Diagnostics::new();
    let root = parse(source, &lookup, &mut diagnostics).expect("parse should succeed");
    (root, diagnostics)
}

#[test]
fn empty_input_parses_to_empty_root() {
    let root = parse_ok(b"");
    assert!(root.body.is_empty());
}

#[test]
fn rcdata_with_raw_block() {
    let source = b"1 RCDATA { 1, \"2\", L\"3\" }";
    let root = parse_ok(source);
    assert_eq!(root.body.len(), 1);
    let Statement::ResourceRawData(raw) = &root.body[0] else {
        panic!("expected raw data, got {:?}", root.body[0]);
    };
    assert_eq!(raw.head.kind, ResourceKind::RcData);
    assert_eq!(raw.raw_data.len(), 3);
}

#[test]
fn raw_data_commas_are_optional() {
    let source = b"1 RCDATA { 1 2 3 }";
    let root = parse_ok(source);
    let Statement::ResourceRawData(raw) = &root.body[0] else {
        panic!("expected raw data");
    };
    assert_eq!(raw.raw_data.len(), 3);
}

#[test]
fn external_resource_filename() {
    let source = b"1 ICON test.ico";
    let root = parse_ok(source);
    let Statement::ResourceExternal(external) = &root.body[0] else {
        panic!("expected external resource");
    };
    assert_eq!(external.head.kind, ResourceKind::Icon);
    assert_eq!(external.filename.source_slice(source), b"test.ico");
}

#[test]
fn numeric_type_uses_generic_grammar() {
    // Type 4 is RT_MENU, but spelled as a number it takes raw data.
    let root = parse_ok(b"1 4 { 0x01 }");
    let Statement::ResourceRawData(raw) = &root.body[0] else {
        panic!("expected raw data");
    };
    assert_eq!(raw.head.kind, ResourceKind::OrdinalOnly(4));
}

#[test]
fn string_as_numeric_type_is_an_error() {
    let err = parse_err(b"1 6 { }");
    assert!(matches!(err.kind, ParseErrorKind::Type(_)));
}

#[test]
fn icon_rejects_raw_data() {
    let err = parse_err(b"1 ICON { 1 }");
    assert!(matches!(err.kind, ParseErrorKind::RawDataNotAllowed { .. }));
}

#[test]
fn font_resource_requires_ordinal_id() {
    let err = parse_err(b"abc FONT font.fnt");
    assert!(matches!(err.kind, ParseErrorKind::IdMustBeOrdinal { .. }));
    parse_ok(b"1 FONT font.fnt");
}

#[test]
fn memory_attributes_are_collected() {
    let source = b"1 RCDATA FIXED PRELOAD { }";
    let root = parse_ok(source);
    let Statement::ResourceRawData(raw) = &root.body[0] else {
        panic!("expected raw data");
    };
    // Defaults 0x30, FIXED clears MOVEABLE, PRELOAD adds 0x40.
    assert_eq!(raw.head.memory_flags.value, 0x60);
}

#[test]
fn dangling_identifier_at_eof_is_tolerated() {
    let root = parse_ok(b"1 RCDATA { }\nRogue");
    assert_eq!(root.body.len(), 2);
    assert!(matches!(root.body[1], Statement::Invalid(_)));
}

#[test]
fn top_level_language_statement() {
    let root = parse_ok(b"LANGUAGE 9, 1");
    assert!(matches!(root.body[0], Statement::Language(_)));
}

#[test]
fn string_table_entries() {
    let source = b"STRINGTABLE { 1, \"one\"\n 2 \"two\" }";
    let root = parse_ok(source);
    let Statement::StringTable(table) = &root.body[0] else {
        panic!("expected string table");
    };
    assert_eq!(table.strings.len(), 2);
}

#[test]
fn string_table_with_language() {
    let source = b"STRINGTABLE LANGUAGE 7, 1 { 1 \"eins\" }";
    let root = parse_ok(source);
    let Statement::StringTable(table) = &root.body[0] else {
        panic!("expected string table");
    };
    assert!(table.optionals.language.is_some());
}

#[test]
fn accelerators_entries_and_modifiers() {
    let source = b"1 ACCELERATORS { \"^C\", 1, VIRTKEY\n 65, 2, ASCII, SHIFT }";
    let root = parse_ok(source);
    let Statement::Accelerators(table) = &root.body[0] else {
        panic!("expected accelerators");
    };
    assert_eq!(table.entries.len(), 2);
    assert_eq!(table.entries[0].modifiers.len(), 1);
    assert_eq!(table.entries[1].modifiers.len(), 2);
}

#[test]
fn unknown_accelerator_modifier_is_an_error() {
    let err = parse_err(b"1 ACCELERATORS { 65, 2, BOGUS }");
    assert!(matches!(err.kind, ParseErrorKind::ExpectedButGot { .. }));
}

#[test]
fn dialog_with_optional_statements_and_controls() {
    let source = br#"1 DIALOG 10, 20, 200, 100
CAPTION "Hi"
FONT 8, "MS Shell Dlg"
{
    PUSHBUTTON "OK", 1, 5, 5, 40, 14
    EDITTEXT 2, 5, 25, 100, 12
}"#;
    let root = parse_ok(source);
    let Statement::Dialog(dialog) = &root.body[0] else {
        panic!("expected dialog");
    };
    assert!(!dialog.ex);
    assert!(dialog.caption.is_some());
    assert!(dialog.font.is_some());
    assert_eq!(dialog.controls.len(), 2);
    assert_eq!(dialog.controls[0].kind, ControlKind::PushButton);
    assert!(dialog.controls[0].text.is_some());
    assert!(dialog.controls[1].text.is_none());
}

#[test]
fn dialogex_class_digit_becomes_forced_ordinal_and_sticks() {
    let source = b"1 DIALOGEX 0, 0, 10, 10\nCLASS 32770\nMENU mymenu\n{ }";
    let root = parse_ok(source);
    let Statement::Dialog(dialog) = &root.body[0] else {
        panic!("expected dialog");
    };
    assert_eq!(dialog.class.as_ref().unwrap().ordinal, Some(32770));
    // Stickiness: the MENU value is forced into an ordinal as well.
    assert!(dialog.menu.as_ref().unwrap().ordinal.is_some());
}

#[test]
fn dialog_class_name_stays_a_name() {
    let source = b"1 DIALOGEX 0, 0, 10, 10\nCLASS \"MyClass\"\n{ }";
    let root = parse_ok(source);
    let Statement::Dialog(dialog) = &root.body[0] else {
        panic!("expected dialog");
    };
    assert_eq!(dialog.class.as_ref().unwrap().ordinal, None);
}

#[test]
fn control_style_without_comma_warns() {
    let source = b"1 DIALOG 0, 0, 10, 10 { PUSHBUTTON \"x\", 1, 1, 1, 1, 1 0x20 }";
    let (_, diagnostics) = parse_with_diagnostics(source);
    assert!(diagnostics
        .iter()
        .any(|d| d.reason == crate::diagnostics::Reason::ControlStyleParamsMiscompile));
}

#[test]
fn generic_control_statement() {
    let source =
        b"1 DIALOGEX 0, 0, 10, 10 { CONTROL \"t\", 1, BUTTON, 0x50000000, 1, 2, 3, 4 }";
    let root = parse_ok(source);
    let Statement::Dialog(dialog) = &root.body[0] else {
        panic!("expected dialog");
    };
    let control = &dialog.controls[0];
    assert_eq!(control.kind, ControlKind::Control);
    assert!(control.class.is_some());
    assert!(control.style.is_some());
}

#[test]
fn menu_tree() {
    let source = br#"1 MENU
{
    POPUP "&File"
    {
        MENUITEM "&Open", 100
        MENUITEM SEPARATOR
        MENUITEM "E&xit", 101, CHECKED, GRAYED
    }
}"#;
    let root = parse_ok(source);
    let Statement::Menu(menu) = &root.body[0] else {
        panic!("expected menu");
    };
    let MenuItem::Popup { items, .. } = &menu.items[0] else {
        panic!("expected popup");
    };
    assert_eq!(items.len(), 3);
    let MenuItem::Item { options, .. } = &items[2] else {
        panic!("expected item");
    };
    assert_eq!(options.len(), 2);
}

#[test]
fn menuex_item_params() {
    let source = b"1 MENUEX { MENUITEM \"a\", 100, 0x800, 3 }";
    let root = parse_ok(source);
    let Statement::Menu(menu) = &root.body[0] else {
        panic!("expected menu");
    };
    assert!(menu.ex);
    let MenuItem::ItemEx {
        id,
        item_type,
        state,
        ..
    } = &menu.items[0]
    else {
        panic!("expected ex item");
    };
    assert!(id.is_some() && item_type.is_some() && state.is_some());
}

#[test]
fn empty_menu_is_an_error() {
    let err = parse_err(b"1 MENU { }");
    assert_eq!(err.kind, ParseErrorKind::EmptyMenu);
}

#[test]
fn menu_nesting_limit() {
    let mut source = Vec::from(&b"1 MENU {"[..]);
    for _ in 0..=MAX_MENU_NESTING {
        source.extend_from_slice(b" POPUP \"p\" {");
    }
    source.extend_from_slice(b" MENUITEM \"i\", 1");
    for _ in 0..=MAX_MENU_NESTING + 1 {
        source.extend_from_slice(b" }");
    }
    let err = parse_err(&source);
    assert_eq!(err.kind, ParseErrorKind::MenuNestingTooDeep(MAX_MENU_NESTING));
}

#[test]
fn expression_nesting_limit() {
    let mut source = Vec::from(&b"1 RCDATA { "[..]);
    source.extend(std::iter::repeat(b'(').take(201));
    source.extend_from_slice(b"1");
    source.extend(std::iter::repeat(b')').take(201));
    source.extend_from_slice(b" }");
    let err = parse_err(&source);
    assert_eq!(
        err.kind,
        ParseErrorKind::ExpressionNestingTooDeep(MAX_EXPRESSION_NESTING)
    );
}

#[test]
fn stray_close_paren_is_an_error_with_note() {
    let lookup = CodePageLookup::uniform(CodePage::Windows1252);
    let mut diagnostics = Diagnostics::new();
    let err = parse(b"1 RCDATA { ) }", &lookup, &mut diagnostics).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::StrayCloseParen);
    assert!(diagnostics
        .iter()
        .any(|d| d.reason == crate::diagnostics::Reason::NoteStrayCloseParen));
}

#[test]
fn version_info_statement() {
    let source = br#"1 VERSIONINFO
FILEVERSION 1, 2, 3, 4
FILEOS 0x40004
{
    BLOCK "StringFileInfo"
    {
        BLOCK "040904b0"
        {
            VALUE "FileDescription", "demo"
        }
    }
    VALUE "Translation", 0x409, 1200
}"#;
    let root = parse_ok(source);
    let Statement::VersionInfo(info) = &root.body[0] else {
        panic!("expected version info");
    };
    assert_eq!(info.fixed.len(), 2);
    assert_eq!(info.fixed[0].parts.len(), 4);
    assert_eq!(info.blocks.len(), 2);
}

#[test]
fn toolbar_statement() {
    let source = b"1 TOOLBAR 16, 15 { BUTTON 100\n SEPARATOR\n BUTTON 101 }";
    let root = parse_ok(source);
    let Statement::Toolbar(toolbar) = &root.body[0] else {
        panic!("expected toolbar");
    };
    assert_eq!(toolbar.buttons.len(), 3);
}

#[test]
fn unary_plus_surfaces_as_parse_error() {
    let err = parse_err(b"1 RCDATA { +1 }");
    assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
}
