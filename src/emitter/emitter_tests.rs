use super::*;
use crate::code_page::{self, CodePage};
use crate::diagnostics::{Diagnostics, Reason};
use crate::options::Options;
use crate::parser;
use crate::resolver::SearchPaths;

fn compile_with(source: &[u8], options: &Options, search: &SearchPaths) -> (Vec<u8>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let code_pages = code_page::scan(
        source,
        options.default_code_page,
        options.warn_instead_of_error_on_invalid_code_page,
        &mut diagnostics,
    )
    .expect("code page scan should succeed");
    let root = parser::parse(source, &code_pages, &mut diagnostics).expect("parse should succeed");
    let mut out = Vec::new();
    compile(
        &root,
        source,
        &code_pages,
        options,
        search,
        &mut diagnostics,
        &mut out,
    )
    .expect("compile should succeed");
    (out, diagnostics)
}

fn compile_bytes(source: &[u8]) -> Vec<u8> {
    compile_with(source, &Options::default(), &SearchPaths::default()).0
}

const SENTINEL: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, // data_size
    0x20, 0x00, 0x00, 0x00, // header_size
    0xFF, 0xFF, 0x00, 0x00, // type: ordinal 0
    0xFF, 0xFF, 0x00, 0x00, // name: ordinal 0
    0x00, 0x00, 0x00, 0x00, // data version
    0x00, 0x00, // memory flags
    0x00, 0x00, // language
    0x00, 0x00, 0x00, 0x00, // version
    0x00, 0x00, 0x00, 0x00, // characteristics
];

/// Builds the expected header for an ordinal-typed, ordinal-named resource.
fn ordinal_header(
    data_size: u32,
    type_ordinal: u16,
    name_ordinal: u16,
    memory_flags: u16,
    language: u16,
) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&data_size.to_le_bytes());
    bytes.extend_from_slice(&0x20u32.to_le_bytes());
    bytes.extend_from_slice(&[0xFF, 0xFF]);
    bytes.extend_from_slice(&type_ordinal.to_le_bytes());
    bytes.extend_from_slice(&[0xFF, 0xFF]);
    bytes.extend_from_slice(&name_ordinal.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&memory_flags.to_le_bytes());
    bytes.extend_from_slice(&language.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}

#[test]
fn empty_input_writes_only_the_sentinel() {
    assert_eq!(compile_bytes(b""), SENTINEL);
}

#[test]
fn empty_rcdata_resource() {
    let out = compile_bytes(b"1 RCDATA { }");
    let mut expected = SENTINEL.to_vec();
    expected.extend_from_slice(&ordinal_header(0, 10, 1, 0x30, 0x0409));
    assert_eq!(out, expected);
}

#[test]
fn rcdata_mixed_payload() {
    let out = compile_bytes(b"1 RCDATA { 1, \"2\", L\"3\" }");
    let mut expected = SENTINEL.to_vec();
    expected.extend_from_slice(&ordinal_header(5, 10, 1, 0x30, 0x0409));
    expected.extend_from_slice(&[0x01, 0x00, 0x32, 0x33, 0x00]);
    expected.extend_from_slice(&[0x00, 0x00, 0x00]); // pad to 4
    assert_eq!(out, expected);
}

#[test]
fn rcdata_expression_wraps_to_two_bytes() {
    let out = compile_bytes(b"1 RCDATA { 65535 + 1 }");
    let data = &out[32 + 32..];
    assert_eq!(data, &[0x00, 0x00, 0x00, 0x00][..2 + 2]);
    let size = u32::from_le_bytes(out[32..36].try_into().unwrap());
    assert_eq!(size, 2);
}

#[test]
fn rcdata_long_promotion_writes_four_bytes() {
    let out = compile_bytes(b"1 RCDATA { 65535 + 1L }");
    let size = u32::from_le_bytes(out[32..36].try_into().unwrap());
    assert_eq!(size, 4);
    let data = &out[32 + 32..];
    assert_eq!(data, &[0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn zero_is_always_a_name() {
    let out = compile_bytes(b"0 0 { \"hello\" }");
    let mut expected = SENTINEL.to_vec();
    // data_size, header_size
    expected.extend_from_slice(&5u32.to_le_bytes());
    expected.extend_from_slice(&0x20u32.to_le_bytes());
    // type: name "0", name: name "0"
    expected.extend_from_slice(&[0x30, 0x00, 0x00, 0x00]);
    expected.extend_from_slice(&[0x30, 0x00, 0x00, 0x00]);
    expected.extend_from_slice(&0u32.to_le_bytes()); // data version
    expected.extend_from_slice(&0x30u16.to_le_bytes()); // user-defined defaults
    expected.extend_from_slice(&0x0409u16.to_le_bytes());
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(b"hello");
    expected.extend_from_slice(&[0x00, 0x00, 0x00]);
    assert_eq!(out, expected);
}

#[test]
fn icon_statement_splits_sub_resource_and_group() {
    let dir = std::env::temp_dir().join("resc-emitter-icon-test");
    std::fs::create_dir_all(&dir).unwrap();
    let image = [0xAA_u8, 0xBB, 0xCC, 0xDD];
    std::fs::write(
        dir.join("test.ico"),
        crate::formats::formats_tests::ico_bytes(&image),
    )
    .unwrap();

    let search = SearchPaths::new(Some(dir.clone()), Vec::new());
    let (out, _) = compile_with(b"1 ICON test.ico", &Options::default(), &search);

    let mut expected = SENTINEL.to_vec();
    // RT_ICON sub-resource, name ordinal 1, flags 0x1010.
    expected.extend_from_slice(&ordinal_header(4, 3, 1, 0x1010, 0x0409));
    expected.extend_from_slice(&image);
    // GROUP_ICON resource: 6-byte header and one 14-byte entry.
    expected.extend_from_slice(&ordinal_header(20, 14, 1, 0x1030, 0x0409));
    expected.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00]);
    expected.extend_from_slice(&[1, 1, 0, 0]); // width, height, colors, reserved
    expected.extend_from_slice(&1u16.to_le_bytes()); // planes
    expected.extend_from_slice(&32u16.to_le_bytes()); // bit count
    expected.extend_from_slice(&4u32.to_le_bytes()); // bytes in res
    expected.extend_from_slice(&1u16.to_le_bytes()); // sub-resource id
    assert_eq!(out, expected);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn accelerator_entry_bytes_and_virtkey_warning() {
    let (out, diagnostics) = compile_with(
        b"1 ACCELERATORS { \"^C\", 1, VIRTKEY }",
        &Options::default(),
        &SearchPaths::default(),
    );
    let mut expected = SENTINEL.to_vec();
    expected.extend_from_slice(&ordinal_header(8, 9, 1, 0x30, 0x0409));
    expected.extend_from_slice(&0x81u16.to_le_bytes()); // FVIRTKEY | last
    expected.extend_from_slice(&3u16.to_le_bytes()); // 'C' - 0x40
    expected.extend_from_slice(&1u16.to_le_bytes()); // id
    expected.extend_from_slice(&0u16.to_le_bytes()); // padding
    assert_eq!(out, expected);
    assert!(diagnostics
        .iter()
        .any(|d| d.reason == Reason::AsciiCharacterNotEquivalentToVirtualKey));
}

#[test]
fn language_statement_applies_to_following_resources() {
    let out = compile_bytes(b"LANGUAGE 7, 1\n1 RCDATA { }");
    let mut expected = SENTINEL.to_vec();
    expected.extend_from_slice(&ordinal_header(0, 10, 1, 0x30, 7 | (1 << 10)));
    assert_eq!(out, expected);
}

#[test]
fn string_table_bundles_by_id_and_language() {
    let source = b"STRINGTABLE { 0 \"a\"\n 16 \"b\" }\nSTRINGTABLE LANGUAGE 7, 1 { 1 \"c\" }";
    let out = compile_bytes(source);

    // Sentinel, then three bundles: (0x0409, 0), (0x0409, 1), (0x0407, 0)
    // in (language, bundle) order. 0x0409 < 0x0407 is false; BTreeMap
    // orders by language first, so 0x0407 comes before 0x0409.
    let mut offset = 32;
    let mut seen = Vec::new();
    while offset < out.len() {
        let data_size = u32::from_le_bytes(out[offset..offset + 4].try_into().unwrap());
        let header_size = u32::from_le_bytes(out[offset + 4..offset + 8].try_into().unwrap());
        let type_ordinal = u16::from_le_bytes(out[offset + 10..offset + 12].try_into().unwrap());
        let name_ordinal = u16::from_le_bytes(out[offset + 14..offset + 16].try_into().unwrap());
        let language = u16::from_le_bytes(out[offset + 22..offset + 24].try_into().unwrap());
        seen.push((type_ordinal, name_ordinal, language));
        offset += header_size as usize + ((data_size as usize + 3) & !3);
    }
    assert_eq!(
        seen,
        vec![(6, 1, 0x0407), (6, 1, 0x0409), (6, 2, 0x0409)]
    );
}

#[test]
fn string_table_payload_is_length_prefixed() {
    let out = compile_bytes(b"STRINGTABLE { 1 \"hi\" }");
    // One bundle: 16 slots; slot 1 holds "hi".
    let data = &out[64..];
    let mut expected = Vec::new();
    expected.extend_from_slice(&0u16.to_le_bytes()); // slot 0 empty
    expected.extend_from_slice(&2u16.to_le_bytes());
    expected.extend_from_slice(&(b'h' as u16).to_le_bytes());
    expected.extend_from_slice(&(b'i' as u16).to_le_bytes());
    for _ in 2..16 {
        expected.extend_from_slice(&0u16.to_le_bytes());
    }
    assert_eq!(data, expected);
}

#[test]
fn duplicate_string_id_is_an_error() {
    let source = b"STRINGTABLE { 1 \"a\"\n 1 \"b\" }";
    let mut diagnostics = Diagnostics::new();
    let code_pages = code_page::scan(source, CodePage::Windows1252, false, &mut diagnostics).unwrap();
    let root = parser::parse(source, &code_pages, &mut diagnostics).unwrap();
    let options = Options::default();
    let search = SearchPaths::default();
    let mut out = Vec::new();
    let err = compile(
        &root,
        source,
        &code_pages,
        &options,
        &search,
        &mut diagnostics,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        CompileErrorKind::DuplicateStringId { id: 1 }
    ));
}

#[test]
fn missing_file_is_an_error() {
    let source = b"1 ICON missing.ico";
    let mut diagnostics = Diagnostics::new();
    let code_pages = code_page::scan(source, CodePage::Windows1252, false, &mut diagnostics).unwrap();
    let root = parser::parse(source, &code_pages, &mut diagnostics).unwrap();
    let options = Options::default();
    let search = SearchPaths::default();
    let mut out = Vec::new();
    let err = compile(
        &root,
        source,
        &code_pages,
        &options,
        &search,
        &mut diagnostics,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::FileNotFound { .. }));
}

#[test]
fn dialog_header_layout() {
    let source = b"1 DIALOG 1, 2, 30, 40\nCAPTION \"Hi\"\n{ }";
    let out = compile_bytes(source);
    let data = &out[64..];
    // style: defaults | WS_CAPTION
    let style = u32::from_le_bytes(data[0..4].try_into().unwrap());
    assert_eq!(style, 0x8088_0000 | 0x00C0_0000);
    let exstyle = u32::from_le_bytes(data[4..8].try_into().unwrap());
    assert_eq!(exstyle, 0);
    let count = u16::from_le_bytes(data[8..10].try_into().unwrap());
    assert_eq!(count, 0);
    let x = u16::from_le_bytes(data[10..12].try_into().unwrap());
    let y = u16::from_le_bytes(data[12..14].try_into().unwrap());
    assert_eq!((x, y), (1, 2));
    // menu 0, class 0, then the caption.
    assert_eq!(&data[18..22], &[0x00, 0x00, 0x00, 0x00]);
    assert_eq!(&data[22..28], &[b'H', 0x00, b'i', 0x00, 0x00, 0x00]);
}

#[test]
fn dialogex_header_has_signature_and_help_id() {
    let source = b"1 DIALOGEX 1, 2, 30, 40, 99\n{ }";
    let out = compile_bytes(source);
    let data = &out[64..];
    assert_eq!(&data[0..4], &[0x01, 0x00, 0xFF, 0xFF]);
    let help_id = u32::from_le_bytes(data[4..8].try_into().unwrap());
    assert_eq!(help_id, 99);
}

#[test]
fn dialog_control_gets_implicit_styles() {
    let source = b"1 DIALOG 0, 0, 10, 10 { PUSHBUTTON \"OK\", 3, 1, 2, 3, 4 }";
    let out = compile_bytes(source);
    let data = &out[64..];
    // Header: 8 style/exstyle, 2 count, 8 dims, 2 menu, 2 class, 2 title.
    let control = &data[24..];
    let style = u32::from_le_bytes(control[0..4].try_into().unwrap());
    assert_eq!(style, 0x4000_0000 | 0x1000_0000 | 0x0001_0000);
    let id = u16::from_le_bytes(control[16..18].try_into().unwrap());
    assert_eq!(id, 3);
    // class: ordinal BUTTON
    assert_eq!(&control[18..22], &[0xFF, 0xFF, 0x80, 0x00]);
    // title "OK"
    assert_eq!(&control[22..28], &[b'O', 0x00, b'K', 0x00, 0x00, 0x00]);
    // no creation data
    assert_eq!(&control[28..30], &[0x00, 0x00]);
}

#[test]
fn menu_items_set_end_flags() {
    let source = b"1 MENU { POPUP \"&File\" { MENUITEM \"Open\", 100 } }";
    let out = compile_bytes(source);
    let data = &out[64..];
    // version 0, header size 0.
    assert_eq!(&data[0..4], &[0x00, 0x00, 0x00, 0x00]);
    // popup: MF_POPUP | MF_END
    let flags = u16::from_le_bytes(data[4..6].try_into().unwrap());
    assert_eq!(flags, 0x10 | 0x80);
    // "&File" text follows, no id for popups.
    assert_eq!(&data[6..10], &[b'&', 0x00, b'F', 0x00]);
}

#[test]
fn versioninfo_fixed_info_signature() {
    let source = b"1 VERSIONINFO\nFILEVERSION 1, 2, 3, 4\n{ }";
    let out = compile_bytes(source);
    let data = &out[64..];
    // length, value_length = 52, type = 0.
    let value_length = u16::from_le_bytes(data[2..4].try_into().unwrap());
    assert_eq!(value_length, 52);
    let node_type = u16::from_le_bytes(data[4..6].try_into().unwrap());
    assert_eq!(node_type, 0);
    // key "VS_VERSION_INFO" + NUL, then padding to 4, then the signature.
    let key_end = 6 + 2 * (15 + 1);
    let fixed_start = (key_end + 3) & !3;
    assert_eq!(
        &data[fixed_start..fixed_start + 4],
        &0xFEEF_04BDu32.to_le_bytes()
    );
    let file_version_ms =
        u32::from_le_bytes(data[fixed_start + 8..fixed_start + 12].try_into().unwrap());
    assert_eq!(file_version_ms, (1 << 16) | 2);
}

#[test]
fn versioninfo_mixed_value_warns() {
    let source = b"1 VERSIONINFO { VALUE \"k\", \"text\", 5 }";
    let (_, diagnostics) = compile_with(source, &Options::default(), &SearchPaths::default());
    assert!(diagnostics
        .iter()
        .any(|d| d.reason == Reason::VersionValueMixedTypes));
}

#[test]
fn versioninfo_string_without_comma_warns() {
    let source = b"1 VERSIONINFO { VALUE \"k\" \"text\" }";
    let (_, diagnostics) = compile_with(source, &Options::default(), &SearchPaths::default());
    assert!(diagnostics
        .iter()
        .any(|d| d.reason == Reason::VersionValuePadding));
}

#[test]
fn string_length_limit_is_enforced() {
    let mut options = Options::default();
    options.max_string_literal_code_units = 3;
    let source = b"STRINGTABLE { 1 \"abcd\" }";
    let mut diagnostics = Diagnostics::new();
    let code_pages = code_page::scan(source, CodePage::Windows1252, false, &mut diagnostics).unwrap();
    let root = parser::parse(source, &code_pages, &mut diagnostics).unwrap();
    let search = SearchPaths::default();
    let mut out = Vec::new();
    let err = compile(
        &root,
        source,
        &code_pages,
        &options,
        &search,
        &mut diagnostics,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::String(_)));
}

#[test]
fn toolbar_payload_layout() {
    let out = compile_bytes(b"1 TOOLBAR 16, 15 { BUTTON 100\n SEPARATOR }");
    let data = &out[64..];
    let mut expected = Vec::new();
    expected.extend_from_slice(&1u16.to_le_bytes());
    expected.extend_from_slice(&16u16.to_le_bytes());
    expected.extend_from_slice(&15u16.to_le_bytes());
    expected.extend_from_slice(&2u16.to_le_bytes());
    expected.extend_from_slice(&100u16.to_le_bytes());
    expected.extend_from_slice(&0u16.to_le_bytes());
    assert_eq!(data, expected);
}
