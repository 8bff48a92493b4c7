//! Resource type classification and memory flags.
//!
//! A statement's *type* token decides everything downstream: which grammar
//! the parser uses for the body, which emitter runs, and which memory flags
//! apply by default. Keywords map to predefined ordinals; a numeric type
//! keeps its ordinal and is parsed with the generic raw-data/external
//! grammar even when the number happens to match a predefined type.

use crate::code_page::CodePage;
use crate::literals::{maybe_ordinal_from_text, NameOrOrdinal};

/// Predefined resource type ordinals from the reference SDK.
pub mod rt {
    pub const CURSOR: u16 = 1;
    pub const BITMAP: u16 = 2;
    pub const ICON: u16 = 3;
    pub const MENU: u16 = 4;
    pub const DIALOG: u16 = 5;
    pub const STRING: u16 = 6;
    pub const FONTDIR: u16 = 7;
    pub const FONT: u16 = 8;
    pub const ACCELERATOR: u16 = 9;
    pub const RCDATA: u16 = 10;
    pub const MESSAGETABLE: u16 = 11;
    pub const GROUP_CURSOR: u16 = 12;
    pub const GROUP_ICON: u16 = 14;
    pub const VERSION: u16 = 16;
    pub const DLGINCLUDE: u16 = 17;
    pub const PLUGPLAY: u16 = 19;
    pub const VXD: u16 = 20;
    pub const ANICURSOR: u16 = 21;
    pub const ANIICON: u16 = 22;
    pub const HTML: u16 = 23;
    pub const MANIFEST: u16 = 24;
    pub const DLGINIT: u16 = 240;
    pub const TOOLBAR: u16 = 241;
}

/// Semantic classification of a statement's type token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResourceKind {
    Accelerators,
    Bitmap,
    Cursor,
    Dialog,
    DialogEx,
    DlgInclude,
    DlgInit,
    Font,
    Html,
    Icon,
    Menu,
    MenuEx,
    MessageTable,
    PlugPlay,
    RcData,
    StringTable,
    Toolbar,
    UserDefined,
    VersionInfo,
    Vxd,
    /// A numeric type matching a predefined ordinal that has no keyword
    /// (or whose keyword grammar does not apply to numeric types).
    OrdinalOnly(u16),
}

impl ResourceKind {
    /// Classifies an unquoted type token.
    pub fn from_type_text(bytes: &[u8], input: CodePage) -> Result<Self, TypeError> {
        if let Some(ordinal) = maybe_ordinal_from_text(bytes, input) {
            return Self::from_ordinal(ordinal);
        }
        let kind = match () {
            () if bytes.eq_ignore_ascii_case(b"ACCELERATORS") => Self::Accelerators,
            () if bytes.eq_ignore_ascii_case(b"BITMAP") => Self::Bitmap,
            () if bytes.eq_ignore_ascii_case(b"CURSOR") => Self::Cursor,
            () if bytes.eq_ignore_ascii_case(b"DIALOG") => Self::Dialog,
            () if bytes.eq_ignore_ascii_case(b"DIALOGEX") => Self::DialogEx,
            () if bytes.eq_ignore_ascii_case(b"DLGINCLUDE") => Self::DlgInclude,
            () if bytes.eq_ignore_ascii_case(b"DLGINIT") => Self::DlgInit,
            () if bytes.eq_ignore_ascii_case(b"FONT") => Self::Font,
            () if bytes.eq_ignore_ascii_case(b"HTML") => Self::Html,
            () if bytes.eq_ignore_ascii_case(b"ICON") => Self::Icon,
            () if bytes.eq_ignore_ascii_case(b"MENU") => Self::Menu,
            () if bytes.eq_ignore_ascii_case(b"MENUEX") => Self::MenuEx,
            () if bytes.eq_ignore_ascii_case(b"MESSAGETABLE") => Self::MessageTable,
            () if bytes.eq_ignore_ascii_case(b"PLUGPLAY") => Self::PlugPlay,
            () if bytes.eq_ignore_ascii_case(b"RCDATA") => Self::RcData,
            () if bytes.eq_ignore_ascii_case(b"STRINGTABLE") => Self::StringTable,
            () if bytes.eq_ignore_ascii_case(b"TOOLBAR") => Self::Toolbar,
            () if bytes.eq_ignore_ascii_case(b"VERSIONINFO") => Self::VersionInfo,
            () if bytes.eq_ignore_ascii_case(b"VXD") => Self::Vxd,
            () => Self::UserDefined,
        };
        Ok(kind)
    }

    /// Classifies a numeric type. Type 6 (STRING) is reserved for the
    /// compiler's own string-table bundles and cannot be written directly.
    pub fn from_ordinal(ordinal: u16) -> Result<Self, TypeError> {
        if ordinal == rt::STRING {
            return Err(TypeError::StringTypeNotAllowed);
        }
        if ordinal >= 256 {
            return Ok(Self::UserDefined);
        }
        Ok(Self::OrdinalOnly(ordinal))
    }

    /// The predefined ordinal written to the resource header, if any.
    pub fn predefined_ordinal(self) -> Option<u16> {
        match self {
            Self::Accelerators => Some(rt::ACCELERATOR),
            Self::Bitmap => Some(rt::BITMAP),
            Self::Cursor => Some(rt::GROUP_CURSOR),
            Self::Dialog | Self::DialogEx => Some(rt::DIALOG),
            Self::DlgInclude => Some(rt::DLGINCLUDE),
            Self::DlgInit => Some(rt::DLGINIT),
            Self::Font => Some(rt::FONT),
            Self::Html => Some(rt::HTML),
            Self::Icon => Some(rt::GROUP_ICON),
            Self::Menu | Self::MenuEx => Some(rt::MENU),
            Self::MessageTable => Some(rt::MESSAGETABLE),
            Self::PlugPlay => Some(rt::PLUGPLAY),
            Self::RcData => Some(rt::RCDATA),
            Self::StringTable => Some(rt::STRING),
            Self::Toolbar => Some(rt::TOOLBAR),
            Self::VersionInfo => Some(rt::VERSION),
            Self::Vxd => Some(rt::VXD),
            Self::OrdinalOnly(ordinal) => Some(ordinal),
            Self::UserDefined => None,
        }
    }

    /// Whether the body grammar is the generic raw-data-or-filename one.
    pub fn uses_generic_grammar(self) -> bool {
        matches!(
            self,
            Self::Bitmap
                | Self::Cursor
                | Self::DlgInit
                | Self::Font
                | Self::Html
                | Self::Icon
                | Self::MessageTable
                | Self::PlugPlay
                | Self::RcData
                | Self::UserDefined
                | Self::Vxd
                | Self::OrdinalOnly(_)
        )
    }

    /// Whether a `{ ... }` raw-data body is legal. Types that read their
    /// payload from an external file (icons, bitmaps, fonts) reject it.
    pub fn allows_raw_data(self) -> bool {
        matches!(
            self,
            Self::DlgInit | Self::Html | Self::RcData | Self::UserDefined | Self::OrdinalOnly(_)
        )
    }

    /// Only FONT ids must be ordinals.
    pub fn requires_ordinal_id(self) -> bool {
        matches!(self, Self::Font)
    }

    /// Whether the referenced file is consumed as an icon/cursor directory.
    pub fn is_icon_or_cursor(self) -> bool {
        matches!(self, Self::Icon | Self::Cursor)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("RT_STRING (6) cannot be used as a resource type directly")]
    StringTypeNotAllowed,
}

pub const MOVEABLE: u16 = 0x10;
/// SHARED and PURE are the same bit.
pub const SHARED: u16 = 0x20;
pub const PRELOAD: u16 = 0x40;
pub const DISCARDABLE: u16 = 0x1000;

/// The 16-bit memory-flags bitfield of a resource header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryFlags {
    pub value: u16,
}

impl MemoryFlags {
    /// Default flags per resource type.
    pub fn defaults(type_ordinal: Option<u16>) -> Self {
        let value = match type_ordinal {
            Some(rt::ICON | rt::CURSOR | rt::ANICURSOR | rt::ANIICON) => MOVEABLE | DISCARDABLE,
            Some(
                rt::GROUP_ICON | rt::GROUP_CURSOR | rt::STRING | rt::FONT | rt::DIALOG | rt::MENU,
            ) => MOVEABLE | SHARED | DISCARDABLE,
            Some(rt::FONTDIR) => MOVEABLE | PRELOAD,
            // RCDATA, BITMAP, HTML, ACCELERATOR, MANIFEST, VERSION and every
            // user-defined type.
            _ => MOVEABLE | SHARED,
        };
        Self { value }
    }

    /// Applies one memory attribute keyword. Returns false when the keyword
    /// is not a memory attribute.
    pub fn apply(&mut self, keyword: &[u8]) -> bool {
        if keyword.eq_ignore_ascii_case(b"MOVEABLE") {
            self.value |= MOVEABLE;
        } else if keyword.eq_ignore_ascii_case(b"FIXED") {
            self.value &= !(MOVEABLE | DISCARDABLE);
        } else if keyword.eq_ignore_ascii_case(b"SHARED") || keyword.eq_ignore_ascii_case(b"PURE")
        {
            self.value |= SHARED;
        } else if keyword.eq_ignore_ascii_case(b"NONSHARED")
            || keyword.eq_ignore_ascii_case(b"IMPURE")
        {
            self.value &= !(SHARED | DISCARDABLE);
        } else if keyword.eq_ignore_ascii_case(b"PRELOAD") {
            self.value |= PRELOAD;
        } else if keyword.eq_ignore_ascii_case(b"LOADONCALL") {
            self.value &= !PRELOAD;
        } else if keyword.eq_ignore_ascii_case(b"DISCARDABLE") {
            self.value |= DISCARDABLE | MOVEABLE | SHARED;
        } else {
            return false;
        }
        true
    }

    pub fn is_memory_attribute(keyword: &[u8]) -> bool {
        const KEYWORDS: [&[u8]; 9] = [
            b"MOVEABLE",
            b"FIXED",
            b"SHARED",
            b"NONSHARED",
            b"PURE",
            b"IMPURE",
            b"PRELOAD",
            b"LOADONCALL",
            b"DISCARDABLE",
        ];
        KEYWORDS.iter().any(|k| keyword.eq_ignore_ascii_case(k))
    }
}

/// Predefined dialog control class ordinals.
pub mod control_class {
    pub const BUTTON: u16 = 0x80;
    pub const EDIT: u16 = 0x81;
    pub const STATIC: u16 = 0x82;
    pub const LISTBOX: u16 = 0x83;
    pub const SCROLLBAR: u16 = 0x84;
    pub const COMBOBOX: u16 = 0x85;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_page::CodePage;

    #[test]
    fn keywords_classify_case_insensitively() {
        let cp = CodePage::Windows1252;
        assert_eq!(
            ResourceKind::from_type_text(b"rcdata", cp),
            Ok(ResourceKind::RcData)
        );
        assert_eq!(
            ResourceKind::from_type_text(b"DialogEx", cp),
            Ok(ResourceKind::DialogEx)
        );
        assert_eq!(
            ResourceKind::from_type_text(b"MYTYPE", cp),
            Ok(ResourceKind::UserDefined)
        );
    }

    #[test]
    fn numeric_types_use_the_generic_grammar() {
        let cp = CodePage::Windows1252;
        // Type 4 is RT_MENU, but written as a number it is raw data.
        let kind = ResourceKind::from_type_text(b"4", cp).unwrap();
        assert_eq!(kind, ResourceKind::OrdinalOnly(4));
        assert!(kind.uses_generic_grammar());
    }

    #[test]
    fn type_256_and_up_is_user_defined() {
        assert_eq!(ResourceKind::from_ordinal(256), Ok(ResourceKind::UserDefined));
        assert_eq!(ResourceKind::from_ordinal(300), Ok(ResourceKind::UserDefined));
    }

    #[test]
    fn string_type_number_is_rejected() {
        assert_eq!(
            ResourceKind::from_ordinal(6),
            Err(TypeError::StringTypeNotAllowed)
        );
    }

    #[test]
    fn default_memory_flags() {
        assert_eq!(MemoryFlags::defaults(Some(rt::RCDATA)).value, 0x30);
        assert_eq!(MemoryFlags::defaults(Some(rt::ICON)).value, 0x1010);
        assert_eq!(MemoryFlags::defaults(Some(rt::GROUP_ICON)).value, 0x1030);
        assert_eq!(MemoryFlags::defaults(Some(rt::FONTDIR)).value, 0x50);
        assert_eq!(MemoryFlags::defaults(None).value, 0x30);
    }

    #[test]
    fn attribute_application_rules() {
        let mut flags = MemoryFlags::defaults(Some(rt::DIALOG));
        assert_eq!(flags.value, 0x1030);
        flags.apply(b"FIXED");
        assert_eq!(flags.value & (MOVEABLE | DISCARDABLE), 0);
        flags.apply(b"DISCARDABLE");
        assert_eq!(flags.value, MOVEABLE | SHARED | DISCARDABLE);
        assert!(!flags.apply(b"CAPTION"));
    }
}
