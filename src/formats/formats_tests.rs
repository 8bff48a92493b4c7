use super::*;
use std::io::Cursor;

/// Builds a one-entry ICO file wrapping `payload`.
pub fn ico_bytes(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0u16.to_le_bytes()); // reserved
    bytes.extend_from_slice(&1u16.to_le_bytes()); // ICON
    bytes.extend_from_slice(&1u16.to_le_bytes()); // count
    bytes.push(1); // width
    bytes.push(1); // height
    bytes.push(0); // color count
    bytes.push(0); // reserved
    bytes.extend_from_slice(&1u16.to_le_bytes()); // planes
    bytes.extend_from_slice(&32u16.to_le_bytes()); // bit count
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&22u32.to_le_bytes()); // data offset
    bytes.extend_from_slice(payload);
    bytes
}

fn bmp_bytes(header_size: u32, clr_used: u32, extra: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&0u32.to_le_bytes()); // file size (unchecked)
    bytes.extend_from_slice(&0u32.to_le_bytes()); // reserved
    bytes.extend_from_slice(&0u32.to_le_bytes()); // data offset (unchecked)
    bytes.extend_from_slice(&header_size.to_le_bytes());
    let mut info = vec![0u8; 36];
    info[28..32].copy_from_slice(&clr_used.to_le_bytes());
    bytes.extend_from_slice(&info);
    bytes.extend(std::iter::repeat(0u8).take(extra));
    bytes
}

#[test]
fn reads_a_single_entry_icon() {
    let data = ico_bytes(&[0xAA, 0xBB, 0xCC]);
    let dir = read_icon_dir(&mut Cursor::new(&data)).unwrap();
    assert_eq!(dir.kind, IconDirKind::Icon);
    assert_eq!(dir.entries.len(), 1);
    let entry = dir.entries[0];
    assert_eq!(entry.width, 1);
    assert_eq!(entry.bytes_in_res, 3);
    assert_eq!(entry.data_offset, 22);
}

#[test]
fn rejects_non_icon_headers() {
    let err = read_icon_dir(&mut Cursor::new(b"not an icon at all")).unwrap_err();
    assert!(matches!(err, FormatError::UnrecognizedIconHeader));
}

#[test]
fn cursor_type_is_recognized() {
    let mut data = ico_bytes(&[]);
    data[2] = 2; // type = cursor
    let dir = read_icon_dir(&mut Cursor::new(&data)).unwrap();
    assert_eq!(dir.kind, IconDirKind::Cursor);
}

#[test]
fn bitmap_payload_excludes_file_header() {
    let data = bmp_bytes(40, 0, 16);
    let info = validate_bitmap(&mut Cursor::new(&data), data.len() as u64).unwrap();
    assert_eq!(info.payload_offset, 14);
    assert_eq!(info.payload_len, data.len() as u64 - 14);
}

#[test]
fn bitmap_rejects_bad_header_sizes() {
    let data = bmp_bytes(24, 0, 0);
    let err = validate_bitmap(&mut Cursor::new(&data), data.len() as u64).unwrap_err();
    assert!(matches!(err, FormatError::InvalidBitmapHeaderSize(24)));
}

#[test]
fn bitmap_rejects_oversized_palette() {
    // Declares 256 palette entries but carries no palette bytes at all.
    let data = bmp_bytes(40, 256, 0);
    let err = validate_bitmap(&mut Cursor::new(&data), data.len() as u64).unwrap_err();
    assert!(matches!(err, FormatError::BitmapPaletteOutOfBounds { .. }));
}

#[test]
fn core_header_bitmap_is_accepted() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&[0u8; 12]);
    bytes.extend_from_slice(&12u32.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 8]);
    let info = validate_bitmap(&mut Cursor::new(&bytes), bytes.len() as u64).unwrap();
    assert_eq!(info.payload_len, bytes.len() as u64 - 14);
}
