//! The syntax tree produced by [`crate::parser`].
//!
//! Every node is a tagged sum with per-variant fields; emitter dispatch is a
//! `match` on the tag. Ownership is strictly tree-shaped: children live in
//! their parent's `Vec`s and boxes, so a whole parse is dropped as one unit
//! when the [`Root`] goes out of scope. Nodes reference the source only
//! through [`Token`] spans.

use crate::lexer::Token;
use crate::resources::{MemoryFlags, ResourceKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Root {
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `<id> <type> <attrs> <filename>`
    ResourceExternal(ResourceExternal),
    /// `<id> <type> <attrs> { <raw data> }`
    ResourceRawData(ResourceRawData),
    StringTable(StringTable),
    Accelerators(Accelerators),
    Dialog(Dialog),
    Menu(Menu),
    Toolbar(Toolbar),
    VersionInfo(VersionInfo),
    /// Top-level `LANGUAGE p, s`, setting the ambient language.
    Language(Language),
    /// Top-level `VERSION n`.
    Version(SimpleStatement),
    /// Top-level `CHARACTERISTICS n`.
    Characteristics(SimpleStatement),
    /// A dangling identifier before end-of-file; tolerated, never emitted.
    Invalid(Invalid),
}

/// The id token, type token and resolved common attributes every resource
/// statement starts with.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceHead {
    pub id: Token,
    pub type_token: Token,
    pub kind: ResourceKind,
    pub memory_flags: MemoryFlags,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceExternal {
    pub head: ResourceHead,
    pub filename: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceRawData {
    pub head: ResourceHead,
    pub raw_data: Vec<Expression>,
}

/// A `STRINGTABLE` statement. It has no id of its own; its strings are
/// grouped into bundle resources at emit time.
#[derive(Clone, Debug, PartialEq)]
pub struct StringTable {
    pub keyword: Token,
    pub memory_flags: MemoryFlags,
    pub optionals: Optionals,
    pub strings: Vec<StringTableEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringTableEntry {
    pub id: Expression,
    pub text: Token,
}

/// `LANGUAGE`/`VERSION`/`CHARACTERISTICS` statements shared by the resource
/// kinds that accept them between head and body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Optionals {
    pub language: Option<Language>,
    pub version: Option<Expression>,
    pub characteristics: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Language {
    pub keyword: Token,
    pub primary: Expression,
    pub sublanguage: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleStatement {
    pub keyword: Token,
    pub value: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Accelerators {
    pub head: ResourceHead,
    pub optionals: Optionals,
    pub entries: Vec<AcceleratorEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AcceleratorEntry {
    /// A quoted string or number expression naming the key.
    pub event: Expression,
    pub id: Expression,
    /// `VIRTKEY`, `ASCII`, `SHIFT`, `CONTROL`, `ALT`, `NOINVERT`.
    pub modifiers: Vec<Token>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dialog {
    pub head: ResourceHead,
    /// DIALOGEX rather than DIALOG.
    pub ex: bool,
    pub x: Expression,
    pub y: Expression,
    pub width: Expression,
    pub height: Expression,
    /// DIALOGEX only, after the dimensions.
    pub help_id: Option<Expression>,
    pub caption: Option<Token>,
    pub style: Option<Expression>,
    pub exstyle: Option<Expression>,
    pub class: Option<NameValue>,
    pub menu: Option<NameValue>,
    pub font: Option<FontStatement>,
    pub optionals: Optionals,
    pub controls: Vec<Control>,
}

/// A `CLASS` or `MENU` value inside a dialog. The parser resolves the
/// quirky forced-ordinal interpretation, so emission only looks at
/// `ordinal`.
#[derive(Clone, Debug, PartialEq)]
pub struct NameValue {
    pub token: Token,
    pub ordinal: Option<u16>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontStatement {
    pub point_size: Expression,
    pub typeface: Token,
    /// DIALOGEX extras.
    pub weight: Option<Expression>,
    pub italic: Option<Expression>,
    pub charset: Option<Expression>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlKind {
    AutoCheckBox,
    AutoRadioButton,
    Auto3State,
    CheckBox,
    ComboBox,
    /// The generic `CONTROL` statement carrying an explicit class.
    Control,
    CText,
    DefPushButton,
    EditText,
    GroupBox,
    Icon,
    ListBox,
    LText,
    PushBox,
    PushButton,
    RadioButton,
    RText,
    ScrollBar,
    State3,
    UserButton,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Control {
    pub keyword: Token,
    pub kind: ControlKind,
    pub text: Option<Token>,
    pub id: Expression,
    pub x: Expression,
    pub y: Expression,
    pub width: Expression,
    pub height: Expression,
    pub style: Option<Expression>,
    pub exstyle: Option<Expression>,
    /// DIALOGEX only.
    pub help_id: Option<Expression>,
    /// Class of a generic `CONTROL`; a string, literal or number token.
    pub class: Option<Token>,
    /// DIALOGEX creation-data block.
    pub creation_data: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Menu {
    pub head: ResourceHead,
    /// MENUEX rather than MENU.
    pub ex: bool,
    pub optionals: Optionals,
    /// MENUEX help id between head and body.
    pub help_id: Option<Expression>,
    pub items: Vec<MenuItem>,
}

/// Menu items form an arbitrarily nested tree via the popup variants.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuItem {
    Separator {
        keyword: Token,
    },
    Item {
        keyword: Token,
        text: Token,
        id: Expression,
        options: Vec<Token>,
    },
    Popup {
        keyword: Token,
        text: Token,
        options: Vec<Token>,
        items: Vec<MenuItem>,
    },
    ItemEx {
        keyword: Token,
        text: Token,
        id: Option<Expression>,
        item_type: Option<Expression>,
        state: Option<Expression>,
    },
    PopupEx {
        keyword: Token,
        text: Token,
        id: Option<Expression>,
        item_type: Option<Expression>,
        state: Option<Expression>,
        help_id: Option<Expression>,
        items: Vec<MenuItem>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toolbar {
    pub head: ResourceHead,
    pub button_width: Expression,
    pub button_height: Expression,
    pub optionals: Optionals,
    pub buttons: Vec<ToolbarButton>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToolbarButton {
    Button { keyword: Token, id: Expression },
    Separator { keyword: Token },
}

#[derive(Clone, Debug, PartialEq)]
pub struct VersionInfo {
    pub head: ResourceHead,
    pub fixed: Vec<VersionFixed>,
    pub optionals: Optionals,
    pub blocks: Vec<VersionNode>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionFixedKind {
    FileVersion,
    ProductVersion,
    FileFlagsMask,
    FileFlags,
    FileOs,
    FileType,
    FileSubtype,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VersionFixed {
    pub keyword: Token,
    pub kind: VersionFixedKind,
    /// Up to four comma-separated parts; missing parts are zero.
    pub parts: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VersionNode {
    Block {
        keyword: Token,
        key: Token,
        children: Vec<VersionNode>,
    },
    Value {
        keyword: Token,
        key: Token,
        values: Vec<VersionValue>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct VersionValue {
    pub expression: Expression,
    /// Whether a comma preceded this value; its absence after a string
    /// triggers the padding-miscompile warning.
    pub preceded_by_comma: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invalid {
    pub tokens: Vec<Token>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A number, quoted string, or unquoted literal token.
    Literal(Token),
    Binary(BinaryExpression),
    Grouped(GroupedExpression),
    /// `NOT <number>`, legal only inside style-like fields.
    Not(NotExpression),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpression {
    pub operator: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupedExpression {
    pub open: Token,
    pub expression: Box<Expression>,
    pub close: Token,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NotExpression {
    pub keyword: Token,
    pub number: Token,
}

impl Expression {
    pub fn first_token(&self) -> Token {
        match self {
            Self::Literal(token) => *token,
            Self::Binary(binary) => binary.left.first_token(),
            Self::Grouped(grouped) => grouped.open,
            Self::Not(not) => not.keyword,
        }
    }

    pub fn last_token(&self) -> Token {
        match self {
            Self::Literal(token) => *token,
            Self::Binary(binary) => binary.right.last_token(),
            Self::Grouped(grouped) => grouped.close,
            Self::Not(not) => not.number,
        }
    }

    /// The raw source text covered by this expression, operators included.
    /// Filenames written as number expressions use this instead of
    /// evaluation.
    pub fn source_slice<'a>(&self, source: &'a [u8]) -> &'a [u8] {
        let start = self.first_token().start;
        let end = self.last_token().end;
        &source[start..end]
    }
}
