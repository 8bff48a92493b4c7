//! `.ico` / `.cur` directory parsing.
//!
//! The on-disk format is a 6-byte header (`reserved:u16`, `type:u16`,
//! `count:u16`) followed by `count` 16-byte entries, each pointing at its
//! image payload by absolute file offset.

use std::io::Read;

use super::FormatError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IconDirKind {
    Icon,
    Cursor,
}

impl IconDirKind {
    pub fn type_value(self) -> u16 {
        match self {
            Self::Icon => 1,
            Self::Cursor => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IconDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    /// Color planes for icons, hotspot x for cursors.
    pub planes: u16,
    /// Bits per pixel for icons, hotspot y for cursors.
    pub bit_count: u16,
    pub bytes_in_res: u32,
    pub data_offset: u32,
}

#[derive(Clone, Debug)]
pub struct IconDir {
    pub kind: IconDirKind,
    pub entries: Vec<IconDirEntry>,
}

pub fn read_icon_dir<R: Read>(reader: &mut R) -> Result<IconDir, FormatError> {
    let reserved = read_u16(reader)?;
    let type_value = read_u16(reader)?;
    let count = read_u16(reader)?;
    let kind = match (reserved, type_value) {
        (0, 1) => IconDirKind::Icon,
        (0, 2) => IconDirKind::Cursor,
        _ => return Err(FormatError::UnrecognizedIconHeader),
    };

    let mut entries = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        entries.push(IconDirEntry {
            width: read_u8(reader)?,
            height: read_u8(reader)?,
            color_count: read_u8(reader)?,
            reserved: read_u8(reader)?,
            planes: read_u16(reader)?,
            bit_count: read_u16(reader)?,
            bytes_in_res: read_u32(reader)?,
            data_offset: read_u32(reader)?,
        });
    }
    Ok(IconDir { kind, entries })
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, FormatError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(reader: &mut R) -> Result<u16, FormatError> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
