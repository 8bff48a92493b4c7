//! Compilation options.

use std::path::PathBuf;

use crate::code_page::CodePage;

/// The enumerated configuration contract of the compiler core. The driver
/// fills this from the command line.
#[derive(Clone, Debug)]
pub struct Options {
    /// Language id applied to resources before any `LANGUAGE` statement.
    pub default_language_id: u16,
    /// Input and output code page before any `#pragma code_page`.
    pub default_code_page: CodePage,
    /// Maximum UTF-16 code units per string literal.
    pub max_string_literal_code_units: u16,
    /// Append a NUL code unit to every string-table string.
    pub null_terminate_string_table_strings: bool,
    /// Downgrade unknown `#pragma code_page` values from error to warning.
    pub warn_instead_of_error_on_invalid_code_page: bool,
    /// Searched in order, after the source file's own directory.
    pub include_directories: Vec<PathBuf>,
}

pub const DEFAULT_LANGUAGE_ID: u16 = 0x0409;
pub const DEFAULT_MAX_STRING_CODE_UNITS: u16 = 4097;

impl Default for Options {
    fn default() -> Self {
        Self {
            default_language_id: DEFAULT_LANGUAGE_ID,
            default_code_page: CodePage::Windows1252,
            max_string_literal_code_units: DEFAULT_MAX_STRING_CODE_UNITS,
            null_terminate_string_table_strings: false,
            warn_instead_of_error_on_invalid_code_page: false,
            include_directories: Vec::new(),
        }
    }
}

impl Options {
    /// Maps the string-length percentage flag to a code-unit limit:
    /// `floor(8192 * percent / 100)`, except that exactly 100 means 8192.
    /// No percentage reproduces the default of 4097.
    pub fn string_length_limit_from_percent(percent: u16) -> u16 {
        if percent >= 100 {
            8192
        } else {
            ((8192u32 * u32::from(percent)) / 100) as u16
        }
    }
}
