//! Readers for the external binary formats referenced from resource
//! scripts: `.ico`/`.cur` directories and `.bmp` files. Only headers are
//! parsed here; image payloads are streamed straight from file to output by
//! the emitter.

mod bmp;
mod ico;

#[cfg(test)]
pub mod formats_tests;

pub use bmp::{validate_bitmap, BitmapInfo};
pub use ico::{read_icon_dir, IconDir, IconDirEntry, IconDirKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("file is not a valid icon or cursor directory")]
    UnrecognizedIconHeader,
    #[error("icon directory entry points outside the file")]
    IconEntryOutOfBounds,
    #[error("file is not a valid bitmap")]
    UnrecognizedBitmapHeader,
    #[error("unsupported bitmap header size {0}")]
    InvalidBitmapHeaderSize(u32),
    #[error("bitmap declares {declared} palette bytes but only {available} bytes follow the header")]
    BitmapPaletteOutOfBounds { declared: u64, available: u64 },
}
