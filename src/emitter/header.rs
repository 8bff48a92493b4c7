//! `.res` container framing.
//!
//! Every resource is a header followed by its data, both padded to 4-byte
//! boundaries. All fields are written with explicit little-endian byte
//! sequences; nothing here depends on host endianness.

use std::io::{self, Write};

use crate::literals::NameOrOrdinal;

pub fn align4(n: u32) -> u32 {
    (n + 3) & !3
}

/// Zero-fill up to the next 4-byte boundary after `len` bytes.
pub fn write_padding<W: Write>(w: &mut W, len: u32) -> io::Result<()> {
    let pad = align4(len) - len;
    w.write_all(&[0u8; 3][..pad as usize])
}

#[derive(Clone, Debug)]
pub struct ResourceHeader {
    pub type_id: NameOrOrdinal,
    pub name_id: NameOrOrdinal,
    pub data_size: u32,
    pub memory_flags: u16,
    pub language: u16,
    pub version: u32,
    pub characteristics: u32,
}

impl ResourceHeader {
    /// Bytes up to and including the name field, before alignment.
    fn prefix_len(&self) -> u32 {
        8 + self.type_id.byte_len() + self.name_id.byte_len()
    }

    pub fn header_size(&self) -> u32 {
        // The 16 fixed trailing bytes: data version, memory flags,
        // language, version, characteristics.
        align4(self.prefix_len()) + 16
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.data_size.to_le_bytes())?;
        w.write_all(&self.header_size().to_le_bytes())?;
        self.type_id.write(w)?;
        self.name_id.write(w)?;
        write_padding(w, self.prefix_len())?;
        w.write_all(&0u32.to_le_bytes())?; // data version
        w.write_all(&self.memory_flags.to_le_bytes())?;
        w.write_all(&self.language.to_le_bytes())?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.characteristics.to_le_bytes())?;
        Ok(())
    }
}

/// The mandatory empty resource that starts every `.res` stream.
pub fn write_sentinel<W: Write>(w: &mut W) -> io::Result<()> {
    let sentinel = ResourceHeader {
        type_id: NameOrOrdinal::Ordinal(0),
        name_id: NameOrOrdinal::Ordinal(0),
        data_size: 0,
        memory_flags: 0,
        language: 0,
        version: 0,
        characteristics: 0,
    };
    sentinel.write(w)
}
