//! Literal evaluators.
//!
//! The lexer only delimits literals; the functions here give them meaning.
//! Number and string evaluation happen at emit time (strings additionally
//! depend on the code pages in effect at their source line), name-or-ordinal
//! classification happens wherever a resource id or type is consumed.

mod name_ordinal;
mod number;
mod string;


pub use name_ordinal::{
    forced_ordinal_from_text, maybe_ordinal_from_text, NameOrOrdinal, MAX_NAME_CODE_UNITS,
};
pub use number::{parse_number, Number};
pub use string::{parse_narrow_string, parse_wide_string, StringError};
