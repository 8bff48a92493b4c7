//! Bitmap validation.
//!
//! `BITMAP` resources carry the `.bmp` file minus its 14-byte
//! `BITMAPFILEHEADER`. The reference compiler over-reads files whose
//! declared palette is larger than the file; we reject those instead of
//! reproducing the miscompile.

use std::io::Read;

use super::FormatError;

pub const FILE_HEADER_LEN: u64 = 14;

/// How to carve the resource payload out of a validated bitmap file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitmapInfo {
    /// Always the first byte after the BITMAPFILEHEADER.
    pub payload_offset: u64,
    pub payload_len: u64,
}

pub fn validate_bitmap<R: Read>(reader: &mut R, file_len: u64) -> Result<BitmapInfo, FormatError> {
    let mut file_header = [0u8; 14];
    reader
        .read_exact(&mut file_header)
        .map_err(|_| FormatError::UnrecognizedBitmapHeader)?;
    if &file_header[0..2] != b"BM" {
        return Err(FormatError::UnrecognizedBitmapHeader);
    }

    let mut size_bytes = [0u8; 4];
    reader
        .read_exact(&mut size_bytes)
        .map_err(|_| FormatError::UnrecognizedBitmapHeader)?;
    let header_size = u32::from_le_bytes(size_bytes);
    if header_size != 12 && header_size < 40 {
        return Err(FormatError::InvalidBitmapHeaderSize(header_size));
    }

    // The old BITMAPCOREHEADER has no color-count field, so only the
    // 40-byte-and-up headers can declare an oversized palette.
    if header_size >= 40 {
        let mut rest = [0u8; 36];
        reader
            .read_exact(&mut rest)
            .map_err(|_| FormatError::UnrecognizedBitmapHeader)?;
        // Fields after the size: width, height, planes+bitcount,
        // compression, size_image, x_ppm, y_ppm, clr_used.
        let clr_used = u32::from_le_bytes([rest[28], rest[29], rest[30], rest[31]]);
        let palette_bytes = u64::from(clr_used) * 4;
        let available = file_len
            .saturating_sub(FILE_HEADER_LEN)
            .saturating_sub(u64::from(header_size));
        if palette_bytes > available {
            return Err(FormatError::BitmapPaletteOutOfBounds {
                declared: palette_bytes,
                available,
            });
        }
    }

    Ok(BitmapInfo {
        payload_offset: FILE_HEADER_LEN,
        payload_len: file_len.saturating_sub(FILE_HEADER_LEN),
    })
}
